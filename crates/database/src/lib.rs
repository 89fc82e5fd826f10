use std::{path::PathBuf, str::FromStr, time::Duration};

use async_trait::async_trait;
use model::{
    location::Location,
    report::{NewReport, Report},
    WithId,
};
use queries::convert_error;
use road_reports::database::{self, Database, DatabaseError, ReportRepo};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use utility::{
    config::{self, ConfigError},
    id::Id,
};

pub mod data_model;
pub mod queries;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    File(PathBuf),
    /// Private to the pool. Lost once the pool is dropped.
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConnectionInfo {
    pub storage: Storage,
    pub max_connections: u32,
}

impl DatabaseConnectionInfo {
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = config::optional("DATABASE_PATH")
            .unwrap_or_else(|| "driver_bot.db".to_owned());
        let max_connections = config::parsed_or("DATABASE_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_owned(),
            });
        }
        Ok(Self {
            storage: Storage::File(path.into()),
            max_connections,
        })
    }

    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            storage: Storage::File(path.into()),
            max_connections: 5,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            storage: Storage::Memory,
            max_connections: 1,
        }
    }

    pub(self) fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        let options = match &self.storage {
            Storage::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            Storage::Memory => SqliteConnectOptions::from_str("sqlite::memory:")?,
        };
        Ok(options.busy_timeout(BUSY_TIMEOUT))
    }

    pub(self) fn pool_options(&self) -> SqlitePoolOptions {
        match self.storage {
            Storage::File(_) => {
                SqlitePoolOptions::new().max_connections(self.max_connections)
            }
            // every connection to `:memory:` opens its own empty database, so
            // the pool must keep exactly one connection alive forever.
            Storage::Memory => SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    connection: SqlitePool,
}

pub struct SqliteDatabaseAutocommit {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Opens the database and brings the schema up to date.
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> database::Result<Self> {
        let options = database_connection_info
            .connect_options()
            .map_err(convert_error)?;
        let pool = database_connection_info
            .pool_options()
            .connect_with(options)
            .await
            .map_err(convert_error)?;
        log::info!("connected to {:?}", database_connection_info.storage);

        let database = Self { connection: pool };
        database.initialize().await?;
        Ok(database)
    }

    pub async fn close(&self) {
        self.connection.close().await;
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    type Autocommit = SqliteDatabaseAutocommit;

    async fn initialize(&self) -> database::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.connection)
            .await
            .map_err(|why| DatabaseError::Other(Box::new(why)))
    }

    fn auto(&self) -> Self::Autocommit {
        SqliteDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }
}

#[async_trait]
impl ReportRepo for SqliteDatabaseAutocommit {
    async fn insert(&mut self, report: NewReport) -> database::Result<WithId<Report>> {
        queries::report::insert(&self.pool, report).await
    }

    async fn get(&mut self, id: Id<Report>) -> database::Result<WithId<Report>> {
        queries::report::get(&self.pool, id).await
    }

    async fn get_all(&mut self) -> database::Result<Vec<WithId<Report>>> {
        queries::report::get_all(&self.pool).await
    }

    async fn find_nearby(
        &mut self,
        center: &Location,
        half_width: f64,
    ) -> database::Result<Vec<WithId<Report>>> {
        queries::report::get_nearby(&self.pool, center, half_width).await
    }
}
