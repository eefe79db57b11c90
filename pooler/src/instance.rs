use std::fmt;
use std::future::Future;
use std::sync::Arc;

use config::shared::{ControllerConfig, DEFAULT_ADMIN_DATABASE};
use parking_lot::RwLock;
use tracing::{error, info};

use crate::admin::{AdminConnection, AdminConnectionProvider, ControlCommand};
use crate::error::{ErrorKind, PoolerResult};
use crate::pooler_error;
use crate::retry::{
    Backoff, RetryPredicate, pause_retry_predicate, retry_not_ready, retry_on_error,
};

/// Pause and resume control over a single pooler process.
///
/// Implementations are shared between tasks, so every method takes `&self`.
pub trait PoolerInstance {
    /// Returns the last state confirmed by a successful pause or resume.
    fn is_paused(&self) -> bool;

    /// Stops the pooler from forwarding new work.
    fn pause(&self) -> impl Future<Output = PoolerResult<()>> + Send;

    /// Restores forwarding after a pause.
    fn resume(&self) -> impl Future<Output = PoolerResult<()>> + Send;
}

/// Controls a pooler through its administrative console.
///
/// The paused flag is a cache of the last command this instance saw succeed. It is only written
/// after the pooler acknowledged the command, and reading it never waits on the network. Pause
/// retries following a [`Backoff`] because the pooler may still be starting, resume runs once.
pub struct PoolerControlInstance<P> {
    provider: P,
    database: String,
    backoff: Backoff,
    predicate: Arc<dyn RetryPredicate>,
    paused: RwLock<bool>,
}

impl<P> PoolerControlInstance<P>
where
    P: AdminConnectionProvider,
{
    /// Creates an active instance with the default console database and retry schedule.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            database: DEFAULT_ADMIN_DATABASE.to_owned(),
            backoff: Backoff::default(),
            predicate: Arc::new(retry_not_ready),
            paused: RwLock::new(false),
        }
    }

    /// Creates an active instance using the database and retry settings in `config`.
    pub fn from_config(provider: P, config: &ControllerConfig) -> Self {
        Self::new(provider)
            .with_database(config.admin.database.clone())
            .with_backoff(Backoff::from(&config.pause_retry))
            .with_retry_predicate(pause_retry_predicate(config.pause_retry.policy))
    }

    /// Sets the console database commands are sent to.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the schedule used to retry pause.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets which pause failures are retried.
    pub fn with_retry_predicate<R>(mut self, predicate: R) -> Self
    where
        R: RetryPredicate + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Returns the console database commands are sent to.
    pub fn database(&self) -> &str {
        &self.database
    }

    async fn connect(&self, operation: &'static str) -> PoolerResult<P::Connection> {
        match self.provider.connection(&self.database).await {
            Ok(connection) => Ok(connection),
            Err(err) => {
                error!(
                    database = %self.database,
                    error = %err.description(),
                    "failed to obtain an admin connection {operation}"
                );

                Err(pooler_error!(
                    ErrorKind::AdminConnectionUnavailable,
                    "Failed to connect to the pooler admin console",
                    detail = format!("{operation}, database `{}`", self.database),
                    source: err
                ))
            }
        }
    }

    fn set_paused(&self, paused: bool) {
        *self.paused.write() = paused;
    }
}

impl<P> PoolerInstance for PoolerControlInstance<P>
where
    P: AdminConnectionProvider + Send + Sync,
{
    fn is_paused(&self) -> bool {
        *self.paused.read()
    }

    async fn pause(&self) -> PoolerResult<()> {
        let connection = self.connect("while pausing the pooler").await?;

        let command = ControlCommand::Pause;
        let result = retry_on_error(&self.backoff, self.predicate.as_ref(), || {
            connection.execute(command.as_sql())
        })
        .await;

        if let Err(err) = result {
            error!(
                database = %self.database,
                %command,
                error = %err.description(),
                detail = err.detail().unwrap_or_default(),
                "failed to pause the pooler"
            );

            return Err(err.with_context("while pausing the pooler"));
        }

        self.set_paused(true);
        info!(database = %self.database, "pooler paused");

        Ok(())
    }

    async fn resume(&self) -> PoolerResult<()> {
        let connection = self.connect("while resuming the pooler").await?;

        let command = ControlCommand::Resume;
        if let Err(err) = connection.execute(command.as_sql()).await {
            error!(
                database = %self.database,
                %command,
                error = %err.description(),
                detail = err.detail().unwrap_or_default(),
                "failed to resume the pooler"
            );

            return Err(err.with_context("while resuming the pooler"));
        }

        self.set_paused(false);
        info!(database = %self.database, "pooler resumed");

        Ok(())
    }
}

impl<P> fmt::Debug for PoolerControlInstance<P>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolerControlInstance")
            .field("provider", &self.provider)
            .field("database", &self.database)
            .field("backoff", &self.backoff)
            .field("paused", &*self.paused.read())
            .finish_non_exhaustive()
    }
}
