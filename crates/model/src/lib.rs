use std::fmt::Debug;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use serde_with;
use thiserror::Error;
use utility::id::{HasId, Id};

pub mod location;
pub mod report;

pub trait ExampleData {
    fn example_data() -> Self;
}

/// Rejected input. Nothing is written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("unknown report type `{0}`, expected one of: {}", report::ReportKind::known())]
    UnknownKind(String),
    #[error("latitude and longitude are both required")]
    MissingCoordinates,
    #[error("coordinates must be finite numbers")]
    NonFiniteCoordinate,
    #[error("latitude {0} is outside of -90..90")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside of -180..180")]
    LongitudeOutOfRange(f64),
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WithDistance<T> {
    pub distance_km: f64,
    #[serde(flatten)]
    pub content: T,
}

impl<T> WithDistance<T> {
    pub fn new(distance_km: f64, content: T) -> Self {
        Self {
            distance_km,
            content,
        }
    }

    pub fn with_id(self, id: Id<T>) -> WithDistance<WithId<T>>
    where
        T: HasId,
        T::IdType: Debug + Clone + Serialize,
    {
        WithDistance::new(self.distance_km, WithId::new(id, self.content))
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}

/// Sorts by distance, nearest first. Incomparable distances keep their order.
pub fn sort_by_distance<T>(values: &mut [WithDistance<T>]) {
    values.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
