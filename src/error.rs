//! Error and Result types for the connection pool.
//!
//! The taxonomy here is deliberately small and mirrors the failure modes the
//! pool itself can produce (see `DESIGN.md`); it does not attempt to wrap
//! every error a driver might ever return.

use std::fmt;
use std::sync::Arc;

/// A specialized `Result` for pool operations.
pub type Result<T, E = PoolError> = std::result::Result<T, E>;

/// Error resolving an [`Endpoint`][crate::endpoint::Endpoint] from the process environment.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// `DATABASE_URL` was set but could not be parsed as a URL at all.
    #[error("DATABASE_URL is set but is not a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// `DATABASE_URL` (or the individual `PG*` variables) named a scheme this
    /// pool does not know how to open.
    #[error("unrecognized database scheme `{0}`, expected one of: postgres, postgresql")]
    UnrecognizedScheme(String),

    /// A component variable (e.g. `PGPORT`) was present but not parseable.
    #[error("environment variable `{name}` has an invalid value `{value}`")]
    InvalidComponent { name: &'static str, value: String },
}

/// Error establishing a connection, surfaced by a [`Driver`][crate::driver::Driver].
///
/// Opaque by design: the pool only needs a displayable representation for
/// logs and to wrap in [`PoolError::Establishment`]. Driver-specific error
/// types never leak through the pool's public surface.
#[derive(Debug, Clone)]
pub struct DriverError(Arc<str>);

impl DriverError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self(message.to_string().into())
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DriverError {}

/// Errors produced by the pool itself, per the taxonomy in the design spec.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// The endpoint could not be resolved. Terminal; bubbles up from
    /// process initialization.
    #[error("pool configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `acquire` did not complete within the configured `connection_timeout`.
    /// Caller-retryable.
    #[error("timed out waiting for a database connection")]
    AcquisitionTimeout,

    /// The driver rejected every connection attempt during establishment.
    /// Caller-retryable; the offending slot is left for the maintainer to
    /// evict.
    #[error("failed to establish a database connection: {0}")]
    Establishment(DriverError),

    /// The slot table was already at `max_total` and no idle slot could be
    /// found. Should not happen in normal operation — the permit counter is
    /// supposed to prevent it — so this is retained as a safety net rather
    /// than removed.
    #[error("pool exhausted: no connection slots available")]
    PoolExhausted,

    /// `acquire`/`with_connection` was called after `shutdown()`.
    #[error("the pool has been shut down")]
    ShutdownInProgress,
}

/// Result of [`Pool::with_connection`][crate::pool::Pool::with_connection]:
/// either the pool itself failed (timeout, exhaustion, establishment, shutdown)
/// or the caller's own closure returned an error.
///
/// Closure failures are never something the pool recovers from; they are
/// surfaced verbatim so the caller can match on their own error type.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WithConnectionError<E>
where
    E: std::error::Error + 'static,
{
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Closure(E),
}
