//! Pause and resume control for a PgBouncer-style connection pooler.
//!
//! [`instance::PoolerControlInstance`] issues `PAUSE` and `RESUME` on the pooler's
//! administrative console and caches the last confirmed state. Connections come from an
//! [`admin::AdminConnectionProvider`], with [`admin::PgAdminConnectionPool`] as the
//! tokio-postgres backed implementation.
//!
//! Pause tolerates a pooler that is still starting by retrying under a bounded
//! [`retry::Backoff`]. Resume is issued once and reports its failure immediately.

pub mod admin;
pub mod error;
pub mod instance;
mod macros;
pub mod retry;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
