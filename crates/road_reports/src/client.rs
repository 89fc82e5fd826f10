use model::{
    location::Location,
    report::{Report, ReportDraft, NEARBY_EPSILON_DEGREES},
    sort_by_distance, WithDistance, WithId,
};
use utility::{id::Id, let_also::LetAlso};

use crate::{
    database::{Database, ReportRepo},
    ReportResult,
};

/// Handle used by the dispatcher and the http api to talk to the report store.
/// Cheap to clone; every clone shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    id: String,
    pub database: D,
}

impl<D> Client<D>
where
    D: Database,
{
    pub(crate) fn new<S>(id: S, database: D) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: id.into(),
            database,
        }
    }

    /// Validates and stores a report. The report is committed and visible to
    /// `find_nearby` once this returns.
    pub async fn save_report(&self, draft: ReportDraft) -> ReportResult<Id<Report>> {
        let report = draft.validate().map_err(|why| {
            log::debug!("{}: rejected report: {}", self.id, why);
            why
        })?;
        let stored = self.database.auto().insert(report).await?;
        log::info!(
            "{}: stored {} #{} at {}, {}",
            self.id,
            stored.content.kind,
            stored.id,
            stored.content.location.latitude(),
            stored.content.location.longitude()
        );
        Ok(stored.id)
    }

    pub async fn get_report(&self, id: Id<Report>) -> ReportResult<WithId<Report>> {
        Ok(self.database.auto().get(id).await?)
    }

    pub async fn get_reports(&self) -> ReportResult<Vec<WithId<Report>>> {
        Ok(self.database.auto().get_all().await?)
    }

    /// Reports inside the square of `NEARBY_EPSILON_DEGREES` around the given
    /// point, nearest first.
    pub async fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> ReportResult<Vec<WithDistance<WithId<Report>>>> {
        let center = Location::new(latitude, longitude)?;
        self.database
            .auto()
            .find_nearby(&center, NEARBY_EPSILON_DEGREES)
            .await?
            .into_iter()
            .map(|report| report.content.with_distance_to(&center).with_id(report.id))
            .collect::<Vec<_>>()
            .also(|reports| sort_by_distance(reports))
            .let_owned(Ok)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use model::{
        location::Location,
        report::{NewReport, Report, ReportDraft, ReportKind},
        ValidationError, WithId,
    };
    use utility::{geo::BoundingBox, id::Id};

    use crate::{
        database::{self, Database, DatabaseError, ReportRepo},
        server::Server,
        ReportError,
    };

    #[derive(Clone, Default)]
    struct MemoryDatabase {
        rows: Arc<Mutex<Vec<WithId<Report>>>>,
    }

    #[async_trait]
    impl ReportRepo for MemoryDatabase {
        async fn insert(&mut self, report: NewReport) -> database::Result<WithId<Report>> {
            let mut rows = self.rows.lock().unwrap();
            let stored = WithId::new(
                Id::new(rows.len() as i64 + 1),
                Report {
                    kind: report.kind,
                    details: report.details,
                    location: report.location,
                    created_at: Utc::now(),
                },
            );
            rows.push(stored.clone());
            Ok(stored)
        }

        async fn get(&mut self, id: Id<Report>) -> database::Result<WithId<Report>> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.id == id)
                .cloned()
                .ok_or(DatabaseError::NotFound)
        }

        async fn get_all(&mut self) -> database::Result<Vec<WithId<Report>>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn find_nearby(
            &mut self,
            center: &Location,
            half_width: f64,
        ) -> database::Result<Vec<WithId<Report>>> {
            let bbox =
                BoundingBox::around(center.latitude(), center.longitude(), half_width);
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| {
                    bbox.contains(
                        row.content.location.latitude(),
                        row.content.location.longitude(),
                    )
                })
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl Database for MemoryDatabase {
        type Autocommit = MemoryDatabase;

        async fn initialize(&self) -> database::Result<()> {
            Ok(())
        }

        fn auto(&self) -> Self::Autocommit {
            self.clone()
        }
    }

    fn draft(kind: &str, latitude: f64, longitude: f64) -> ReportDraft {
        ReportDraft::new(kind, None::<String>, Some(latitude), Some(longitude))
    }

    #[tokio::test]
    async fn rejected_drafts_are_not_stored() {
        let database = MemoryDatabase::default();
        let client = Server::new(database.clone()).client("test");

        let result = client.save_report(draft("flood", 1.0, 1.0)).await;
        assert!(matches!(
            result,
            Err(ReportError::Validation(ValidationError::UnknownKind(_)))
        ));
        let result = client.save_report(draft("hazard", 100.0, 1.0)).await;
        assert!(result.unwrap_err().is_validation());

        assert!(database.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn nearby_results_are_sorted_by_distance() {
        let client = Server::new(MemoryDatabase::default()).client("test");
        let far = client.save_report(draft("hazard", 50.008, 8.0)).await.unwrap();
        let near = client.save_report(draft("roadblock", 50.001, 8.0)).await.unwrap();
        client.save_report(draft("hazard", 51.0, 8.0)).await.unwrap();

        let nearby = client.find_nearby(50.0, 8.0).await.unwrap();
        let ids = nearby.iter().map(|r| r.content.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![near, far]);
        assert!(nearby[0].distance_km < nearby[1].distance_km);
        assert_eq!(nearby[0].content.content.kind, ReportKind::Roadblock);
    }

    #[tokio::test]
    async fn invalid_center_is_a_validation_error() {
        let client = Server::new(MemoryDatabase::default()).client("test");
        let result = client.find_nearby(0.0, 200.0).await;
        assert!(matches!(
            result,
            Err(ReportError::Validation(ValidationError::LongitudeOutOfRange(_)))
        ));
    }

    #[tokio::test]
    async fn missing_report_is_not_found() {
        let client = Server::new(MemoryDatabase::default()).client("test");
        let result = client.get_report(Id::new(99)).await;
        assert!(matches!(result, Err(ReportError::NotFound)));
    }
}
