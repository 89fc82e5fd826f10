use crate::{client::Client, database::Database, ReportResult};

pub struct Server<D>
where
    D: Database,
{
    database: D,
}

impl<D> Server<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    /// Makes sure the schema exists. Runs on every start.
    pub async fn initialize(&self) -> ReportResult<()> {
        self.database.initialize().await?;
        log::info!("report store initialized");
        Ok(())
    }

    /// A client named after its caller, the name shows up in log lines.
    pub fn client<S: Into<String>>(&self, id: S) -> Client<D> {
        Client::new(id, self.database.clone())
    }
}
