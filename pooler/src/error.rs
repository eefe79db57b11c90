//! Error types and result definitions for pooler control operations.
//!
//! [`PoolerError`] carries an [`ErrorKind`] used by the retry policy, a static description, an
//! optional dynamic detail, the originating error and the callsite where it was raised.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::io;
use std::panic::Location;
use std::sync::Arc;

use config::shared::ValidationError;

/// Convenient result type for pooler operations using [`PoolerError`] as the error type.
pub type PoolerResult<T> = Result<T, PoolerError>;

/// Specific categories of errors that can occur while controlling a pooler.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Connection acquisition
    AdminConnectionUnavailable,

    // Command execution
    PoolerNotReady,
    AdminCommandRejected,

    // Security
    AuthenticationFailed,
    PermissionDenied,

    // Local failures
    ConfigError,
    IoError,

    Unknown,
}

impl ErrorKind {
    /// Returns `true` when the pooler could not be reached, which is expected while it boots.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ErrorKind::PoolerNotReady)
    }
}

/// Main error type for pooler control operations.
#[derive(Debug, Clone)]
pub struct PoolerError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

impl PoolerError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the static description of this error.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the dynamic detail, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the captured backtrace.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Returns the callsite location where the error was created.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Attaches an originating error and returns the modified instance.
    ///
    /// The source is preserved across clones and exposed via [`error::Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Prepends `context` to the dynamic detail, keeping kind, description and source.
    pub fn with_context<C>(mut self, context: C) -> Self
    where
        C: Into<Cow<'static, str>>,
    {
        let context = context.into();
        self.detail = Some(match self.detail.take() {
            Some(detail) => Cow::Owned(format!("{context}: {detail}")),
            None => context,
        });
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        PoolerError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }
}

impl PartialEq for PoolerError {
    fn eq(&self, other: &PoolerError) -> bool {
        self.kind == other.kind && self.description == other.description
    }
}

impl fmt::Display for PoolerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        if let Some(detail) = &self.detail {
            write!(f, "\n  Detail:")?;
            for line in detail.lines() {
                write!(f, "\n    {line}")?;
            }
        }

        if self.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\n  Backtrace:")?;
            for line in self.backtrace.to_string().lines() {
                write!(f, "\n    {line}")?;
            }
        }

        Ok(())
    }
}

impl error::Error for PoolerError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
}

/// Creates a [`PoolerError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for PoolerError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> PoolerError {
        PoolerError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`PoolerError`] from an error kind, static description and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for PoolerError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> PoolerError {
        PoolerError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Converts [`io::Error`] to [`PoolerError`].
///
/// Socket level failures mean the pooler is not listening yet and map to
/// [`ErrorKind::PoolerNotReady`].
impl From<io::Error> for PoolerError {
    #[track_caller]
    fn from(err: io::Error) -> PoolerError {
        let (kind, description) = match err.kind() {
            io::ErrorKind::NotFound
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut => (ErrorKind::PoolerNotReady, "Pooler socket unreachable"),
            _ => (ErrorKind::IoError, "I/O operation failed"),
        };

        let detail = err.to_string();
        PoolerError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`tokio_postgres::Error`] to [`PoolerError`] based on its SQLSTATE.
///
/// Errors without a SQLSTATE come from the transport and are reported as
/// [`ErrorKind::PoolerNotReady`].
impl From<tokio_postgres::Error> for PoolerError {
    #[track_caller]
    fn from(err: tokio_postgres::Error) -> PoolerError {
        use tokio_postgres::error::SqlState;

        let (kind, description) = match err.code() {
            _ if err.is_closed() => (ErrorKind::PoolerNotReady, "Pooler connection closed"),
            None => (ErrorKind::PoolerNotReady, "Pooler connection failed"),
            Some(sqlstate) => match *sqlstate {
                SqlState::CONNECTION_EXCEPTION
                | SqlState::CONNECTION_DOES_NOT_EXIST
                | SqlState::CONNECTION_FAILURE
                | SqlState::SQLCLIENT_UNABLE_TO_ESTABLISH_SQLCONNECTION
                | SqlState::SQLSERVER_REJECTED_ESTABLISHMENT_OF_SQLCONNECTION
                | SqlState::TOO_MANY_CONNECTIONS => {
                    (ErrorKind::PoolerNotReady, "Pooler connection failed")
                }
                SqlState::CANNOT_CONNECT_NOW | SqlState::ADMIN_SHUTDOWN => {
                    (ErrorKind::PoolerNotReady, "Pooler is not accepting connections")
                }
                SqlState::INVALID_AUTHORIZATION_SPECIFICATION | SqlState::INVALID_PASSWORD => (
                    ErrorKind::AuthenticationFailed,
                    "Pooler authentication failed",
                ),
                SqlState::INSUFFICIENT_PRIVILEGE => (
                    ErrorKind::PermissionDenied,
                    "Pooler admin privileges missing",
                ),
                // The pooler console reports most rejections as protocol violations.
                _ => (
                    ErrorKind::AdminCommandRejected,
                    "Pooler rejected the admin command",
                ),
            },
        };

        let detail = err.to_string();
        PoolerError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`ValidationError`] to [`PoolerError`] with [`ErrorKind::ConfigError`].
impl From<ValidationError> for PoolerError {
    #[track_caller]
    fn from(err: ValidationError) -> PoolerError {
        let detail = err.to_string();
        PoolerError::from_components(
            ErrorKind::ConfigError,
            Cow::Borrowed("Invalid configuration"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::{bail, pooler_error};

    #[test]
    fn missing_socket_is_not_ready() {
        let err = PoolerError::from(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.kind(), ErrorKind::PoolerNotReady);
        assert!(err.kind().is_not_ready());
        assert!(err.source().is_some());
    }

    #[test]
    fn other_io_errors_are_io_errors() {
        let err = PoolerError::from(io::Error::other("disk on fire"));
        assert_eq!(err.kind(), ErrorKind::IoError);
        assert_eq!(err.detail(), Some("disk on fire"));
    }

    #[test]
    fn display_contains_kind_description_and_detail() {
        let err = pooler_error!(
            ErrorKind::AdminCommandRejected,
            "Pause failed",
            "already suspended/paused"
        );
        let rendered = err.to_string();

        assert!(rendered.starts_with("[AdminCommandRejected] Pause failed @ "));
        assert!(rendered.contains("already suspended/paused"));
        assert!(rendered.contains(file!()));
    }

    #[test]
    fn validation_errors_are_config_errors() {
        let err = PoolerError::from(ValidationError::EmptyField("admin.username"));
        assert_eq!(err.kind(), ErrorKind::ConfigError);
    }

    #[test]
    fn bail_returns_early() {
        fn fails() -> PoolerResult<()> {
            bail!(ErrorKind::Unknown, "Nothing to see");
        }

        let err = fails().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.description(), "Nothing to see");
    }

    #[test]
    fn context_is_prepended_to_detail() {
        let err = pooler_error!(ErrorKind::PoolerNotReady, "Pooler socket unreachable", "no such file")
            .with_context("while pausing the pooler");
        assert_eq!(err.kind(), ErrorKind::PoolerNotReady);
        assert_eq!(
            err.detail(),
            Some("while pausing the pooler: no such file")
        );

        let err = pooler_error!(ErrorKind::Unknown, "Nothing to see").with_context("first");
        assert_eq!(err.detail(), Some("first"));
    }

    #[test]
    fn source_is_preserved_across_clones() {
        let err = pooler_error!(
            ErrorKind::AdminConnectionUnavailable,
            "Connection unavailable",
            source: io::Error::from(io::ErrorKind::NotFound)
        );
        let cloned = err.clone();

        assert!(cloned.source().is_some());
        assert_eq!(err, cloned);
    }
}
