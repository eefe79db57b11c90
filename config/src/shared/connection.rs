use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_postgres::{Config as TokioPgConnectOptions, config::SslMode as TokioPgSslMode};

use crate::shared::ValidationError;

/// Directory holding the pooler's unix domain socket.
pub const DEFAULT_ADMIN_SOCKET_DIR: &str = "/controller/run";

/// Port the pooler listens on; also selects the socket file name.
pub const DEFAULT_ADMIN_PORT: u16 = 5432;

/// User allowed to run administrative commands on the pooler console.
pub const DEFAULT_ADMIN_USER: &str = "pgbouncer";

/// Logical database exposing the pooler's administrative console.
pub const DEFAULT_ADMIN_DATABASE: &str = "pgbouncer";

const DEFAULT_APPLICATION_NAME: &str = "pooler_controller";

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Connection settings for the pooler's administrative console.
///
/// Replaces a hard-wired DSN: every value has a default matching a pooler sidecar
/// that listens on a local unix socket and trusts the admin user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminConnectionConfig {
    /// Socket directory (or hostname) of the pooler.
    #[serde(default = "default_socket_dir")]
    pub socket_dir: String,
    /// Port of the pooler.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Administrative user.
    #[serde(default = "default_username")]
    pub username: String,
    /// Name of the administrative control database.
    #[serde(default = "default_database")]
    pub database: String,
    /// Value reported as `application_name`.
    #[serde(default = "default_application_name")]
    pub application_name: String,
    /// Timeout for establishing a connection, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_socket_dir() -> String {
    DEFAULT_ADMIN_SOCKET_DIR.to_string()
}

fn default_port() -> u16 {
    DEFAULT_ADMIN_PORT
}

fn default_username() -> String {
    DEFAULT_ADMIN_USER.to_string()
}

fn default_database() -> String {
    DEFAULT_ADMIN_DATABASE.to_string()
}

fn default_application_name() -> String {
    DEFAULT_APPLICATION_NAME.to_string()
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

impl Default for AdminConnectionConfig {
    fn default() -> Self {
        Self {
            socket_dir: default_socket_dir(),
            port: default_port(),
            username: default_username(),
            database: default_database(),
            application_name: default_application_name(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl AdminConnectionConfig {
    /// Returns the connect timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Validates the [`AdminConnectionConfig`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.socket_dir.trim().is_empty() {
            return Err(ValidationError::EmptyField("admin.socket_dir"));
        }
        if self.username.trim().is_empty() {
            return Err(ValidationError::EmptyField("admin.username"));
        }
        if self.database.trim().is_empty() {
            return Err(ValidationError::EmptyField("admin.database"));
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "admin.port".to_string(),
                constraint: "must be > 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Converts the configuration into driver specific connect options.
///
/// The pooler exposes several logical databases behind the same socket, so the database
/// is chosen per connection rather than stored in the options.
pub trait IntoConnectOptions<Output> {
    /// Creates connect options targeting `database`.
    fn with_database(&self, database: &str) -> Output;
}

impl IntoConnectOptions<TokioPgConnectOptions> for AdminConnectionConfig {
    fn with_database(&self, database: &str) -> TokioPgConnectOptions {
        let mut config = TokioPgConnectOptions::new();
        config
            .host(&self.socket_dir)
            .port(self.port)
            .user(&self.username)
            .dbname(database)
            .application_name(&self.application_name)
            .connect_timeout(self.connect_timeout())
            // The console is reached over a local socket and does not negotiate TLS.
            .ssl_mode(TokioPgSslMode::Disable);

        config
    }
}
