use std::fmt;
use std::future::Future;

use crate::error::PoolerResult;

/// Statements understood by the pooler's administrative console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Stops forwarding new work to the backends.
    Pause,
    /// Restores normal forwarding after a pause.
    Resume,
}

impl ControlCommand {
    /// Returns the literal statement sent to the console.
    pub fn as_sql(&self) -> &'static str {
        match self {
            ControlCommand::Pause => "PAUSE",
            ControlCommand::Resume => "RESUME",
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Handle able to run administrative statements against one control database.
///
/// Statements are plain text sent over the simple query protocol, never parameterized.
pub trait AdminConnection {
    /// Executes `command` and waits for the console to acknowledge it.
    ///
    /// Failures carry an [`crate::error::ErrorKind`] so callers can tell a pooler that is not
    /// reachable yet ([`crate::error::ErrorKind::PoolerNotReady`]) from a rejected command.
    fn execute(&self, command: &str) -> impl Future<Output = PoolerResult<()>> + Send;
}

/// Source of [`AdminConnection`] handles.
///
/// Implementations own connection lifecycle, pooling and transport details. The handles they
/// return are borrowed for a single command by the caller and are not kept across operations.
pub trait AdminConnectionProvider {
    /// Handle type returned by [`AdminConnectionProvider::connection`].
    type Connection: AdminConnection + Send + Sync;

    /// Returns a handle for the logical database `database`.
    ///
    /// Fails when no handle can currently be produced; the caller does not retry.
    fn connection(
        &self,
        database: &str,
    ) -> impl Future<Output = PoolerResult<Self::Connection>> + Send;
}
