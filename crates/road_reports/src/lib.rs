use std::error::Error;

use model::ValidationError;
use thiserror::Error;

pub mod client;
pub mod database;
pub mod server;

/// Errors returned by the report service. Callers decide how to present them.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid report: {0}")]
    Validation(#[from] ValidationError),
    #[error("report storage is unavailable: {0}")]
    StorageUnavailable(Box<dyn Error + Send + Sync>),
    #[error("the requested report does not exist")]
    NotFound,
}

impl ReportError {
    pub fn storage<T: Error + Send + Sync + 'static>(why: T) -> Self {
        Self::StorageUnavailable(Box::new(why))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<database::DatabaseError> for ReportError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::Other(why) => Self::StorageUnavailable(why),
        }
    }
}

pub type ReportResult<O> = Result<O, ReportError>;
