use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::HasId;

use crate::{location::Location, ExampleData, ValidationError, WithDistance};

/// Half width of the square around a query point, in degrees. Roughly 1.1 km
/// in latitude; the covered longitude distance shrinks towards the poles.
pub const NEARBY_EPSILON_DEGREES: f64 = 0.01;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Roadblock,
    Hazard,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Roadblock, ReportKind::Hazard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roadblock => "roadblock",
            Self::Hazard => "hazard",
        }
    }

    /// Capitalized name for user facing text.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Roadblock => "Roadblock",
            Self::Hazard => "Hazard",
        }
    }

    /// Single character used to label map markers.
    pub fn marker_label(&self) -> char {
        self.title().chars().next().unwrap_or('X')
    }

    pub fn known() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownKind(s.to_owned()))
    }
}

/// A stored hazard observation. Never updated after creation.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub details: Option<String>,
    #[serde(flatten)]
    pub location: Location,
    pub created_at: DateTime<Utc>,
}

impl HasId for Report {
    type IdType = i64;
}

impl Report {
    pub fn with_distance_to(self, center: &Location) -> WithDistance<Report> {
        WithDistance::new(self.location.distance_km_to(center), self)
    }

    pub fn marker(&self) -> HazardMarker {
        HazardMarker {
            kind: self.kind,
            location: self.location,
        }
    }
}

impl ExampleData for Report {
    fn example_data() -> Self {
        Report {
            kind: ReportKind::Roadblock,
            details: Some("tree down".to_owned()),
            location: Location::example_data(),
            created_at: Utc
                .with_ymd_and_hms(2024, 11, 2, 7, 45, 0)
                .single()
                .unwrap_or_default(),
        }
    }
}

/// Unvalidated report input, as it arrives from a chat message or a request
/// body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl ReportDraft {
    pub fn new<K, D>(
        kind: K,
        details: Option<D>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self
    where
        K: Into<String>,
        D: Into<String>,
    {
        Self {
            kind: kind.into(),
            details: details.map(Into::into),
            latitude,
            longitude,
        }
    }

    pub fn validate(self) -> Result<NewReport, ValidationError> {
        NewReport::try_from(self)
    }
}

/// A draft that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub kind: ReportKind,
    pub details: Option<String>,
    pub location: Location,
}

impl TryFrom<ReportDraft> for NewReport {
    type Error = ValidationError;

    fn try_from(draft: ReportDraft) -> Result<Self, Self::Error> {
        let kind = draft.kind.parse::<ReportKind>()?;
        let location = Location::from_parts(draft.latitude, draft.longitude)?;
        // blank details carry no information
        let details = draft
            .details
            .map(|details| details.trim().to_owned())
            .filter(|details| !details.is_empty());
        Ok(NewReport {
            kind,
            details,
            location,
        })
    }
}

/// What the map renderer needs to draw one marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HazardMarker {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    #[serde(flatten)]
    pub location: Location,
}
