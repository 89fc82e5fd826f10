use chrono::{DateTime, Utc};
use model::{
    location::Location,
    report::{Report, ReportKind},
};
use road_reports::database::{DatabaseError, Result};
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::DatabaseRow;

/// A hazard report.
/// Table: `reports`
#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
    pub id: i64,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub details: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

impl DatabaseRow for ReportRow {
    type Model = Report;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Result<Self::Model> {
        let kind: ReportKind = self
            .kind
            .parse()
            .map_err(|why| DatabaseError::Other(Box::new(why)))?;
        let location = Location::new(self.latitude, self.longitude)
            .map_err(|why| DatabaseError::Other(Box::new(why)))?;
        Ok(Report {
            kind,
            details: self.details,
            location,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str, latitude: f64) -> ReportRow {
        ReportRow {
            id: 7,
            kind: kind.to_owned(),
            details: None,
            latitude,
            longitude: 10.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn converts_valid_rows() {
        let report = row("hazard", 50.0).to_model().unwrap();
        assert_eq!(report.kind, ReportKind::Hazard);
        assert_eq!(report.location.latitude(), 50.0);
    }

    #[test]
    fn corrupt_rows_are_errors() {
        assert!(row("meteor", 50.0).to_model().is_err());
        assert!(row("hazard", 123.0).to_model().is_err());
    }
}
