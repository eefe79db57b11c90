use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::admin::{AdminConnection, AdminConnectionProvider};
use crate::error::{ErrorKind, PoolerError, PoolerResult};
use crate::pooler_error;
use crate::test_utils::notify::TimedNotify;

#[derive(Debug, Default)]
struct Inner {
    connection_error: Option<PoolerError>,
    outcomes: VecDeque<PoolerResult<()>>,
    fallback_error: Option<PoolerError>,
    connection_requests: Vec<String>,
    executed: Vec<String>,
    execute_notifiers: Vec<Arc<Notify>>,
    gate: Option<Arc<Notify>>,
}

/// In-memory [`AdminConnectionProvider`] replaying scripted outcomes.
///
/// Every executed command consumes the next queued outcome. Once the queue is empty commands
/// fail with the error set through [`ScriptedAdminConnectionProvider::fail_every_execution`], or
/// succeed when none was set. Clones share the same script and history.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAdminConnectionProvider {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedAdminConnectionProvider {
    /// Creates a provider whose commands all succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every connection request fail with `error`.
    pub fn fail_connections(&self, error: PoolerError) {
        self.inner.lock().connection_error = Some(error);
    }

    /// Lets connection requests succeed again.
    pub fn restore_connections(&self) {
        self.inner.lock().connection_error = None;
    }

    /// Queues the outcome of the next unscripted command.
    pub fn push_outcome(&self, outcome: PoolerResult<()>) {
        self.inner.lock().outcomes.push_back(outcome);
    }

    /// Queues `count` failures of kind `kind`.
    pub fn push_failures(&self, kind: ErrorKind, count: usize) {
        let mut inner = self.inner.lock();
        for _ in 0..count {
            inner
                .outcomes
                .push_back(Err(pooler_error!(kind, "Scripted admin command failure")));
        }
    }

    /// Fails every command not covered by a queued outcome with `error`.
    pub fn fail_every_execution(&self, error: PoolerError) {
        self.inner.lock().fallback_error = Some(error);
    }

    /// Suspends every command until the returned [`Notify`] hands out a permit.
    ///
    /// Each permit releases exactly one command.
    pub fn hold_executions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.inner.lock().gate = Some(gate.clone());

        gate
    }

    /// Returns a notification fired every time a command reaches the provider.
    pub fn notify_on_execute(&self) -> TimedNotify {
        let notify = Arc::new(Notify::new());
        self.inner.lock().execute_notifiers.push(notify.clone());

        TimedNotify::new(notify)
    }

    /// Databases passed to [`AdminConnectionProvider::connection`], in call order.
    pub fn connection_requests(&self) -> Vec<String> {
        self.inner.lock().connection_requests.clone()
    }

    /// Commands received so far, in call order.
    pub fn executed(&self) -> Vec<String> {
        self.inner.lock().executed.clone()
    }

    /// Number of commands received so far.
    pub fn execution_count(&self) -> usize {
        self.inner.lock().executed.len()
    }
}

impl AdminConnectionProvider for ScriptedAdminConnectionProvider {
    type Connection = ScriptedAdminConnection;

    async fn connection(&self, database: &str) -> PoolerResult<ScriptedAdminConnection> {
        let mut inner = self.inner.lock();
        inner.connection_requests.push(database.to_owned());

        if let Some(error) = &inner.connection_error {
            return Err(error.clone());
        }

        Ok(ScriptedAdminConnection {
            inner: self.inner.clone(),
        })
    }
}

/// Handle returned by [`ScriptedAdminConnectionProvider`].
#[derive(Debug, Clone)]
pub struct ScriptedAdminConnection {
    inner: Arc<Mutex<Inner>>,
}

impl AdminConnection for ScriptedAdminConnection {
    async fn execute(&self, command: &str) -> PoolerResult<()> {
        let gate = {
            let mut inner = self.inner.lock();
            inner.executed.push(command.to_owned());
            for notifier in &inner.execute_notifiers {
                notifier.notify_one();
            }

            inner.gate.clone()
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut inner = self.inner.lock();
        match inner.outcomes.pop_front() {
            Some(outcome) => outcome,
            None => match &inner.fallback_error {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            },
        }
    }
}
