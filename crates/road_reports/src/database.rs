use std::{error, result};

use async_trait::async_trait;
use model::{
    location::Location,
    report::{NewReport, Report},
    WithId,
};
use thiserror::Error;
use utility::id::Id;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait ReportRepo {
    /// Stores a new report. The returned id is fresh and never handed out again.
    async fn insert(&mut self, report: NewReport) -> Result<WithId<Report>>;

    async fn get(&mut self, id: Id<Report>) -> Result<WithId<Report>>;

    async fn get_all(&mut self) -> Result<Vec<WithId<Report>>>;

    /// Returns every report whose latitude and longitude both differ from the
    /// center by strictly less than `half_width` degrees. No ordering.
    async fn find_nearby(
        &mut self,
        center: &Location,
        half_width: f64,
    ) -> Result<Vec<WithId<Report>>>;
}

pub trait DatabaseOperations: ReportRepo {}

impl<T: ReportRepo> DatabaseOperations for T {}

/// trait to implement a report database.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Autocommit: DatabaseOperations + Send;

    /// Creates the schema if it does not exist yet. Safe to call repeatedly.
    async fn initialize(&self) -> Result<()>;

    fn auto(&self) -> Self::Autocommit;
}
