//! The process-wide pool instance (spec §4.6).
//!
//! Grounded in the once-per-process initialization pattern the teacher uses
//! for global state, but built on `once_cell::sync::Lazy<tokio::sync::Mutex<..>>`
//! rather than a bare `OnceCell`: unlike the teacher's immutable globals,
//! this one must support `shutdown()` clearing it for test-isolation
//! re-initialization, which needs an async-aware mutex guarding the whole
//! "check, build, store" sequence rather than a write-once cell.

use once_cell::sync::Lazy;
use tokio::sync::Mutex;

use crate::driver::{Driver, PostgresDriver};
use crate::endpoint::Endpoint;
use crate::error::{PoolError, WithConnectionError};
use crate::pool::{Pool, PoolConfig, PoolStats};

static POOL: Lazy<Mutex<Option<Pool<PostgresDriver>>>> = Lazy::new(|| Mutex::new(None));

/// Returns the process-wide pool, building it on first call.
///
/// Guarded by a single construction mutex, so concurrent callers racing to
/// initialize the pool for the first time never build two: the loser of the
/// race simply observes the winner's result once it unlocks.
pub async fn get_pool() -> Result<Pool<PostgresDriver>, PoolError> {
    let mut guard = POOL.lock().await;

    if let Some(pool) = guard.as_ref() {
        return Ok(pool.clone());
    }

    let endpoint = Endpoint::resolve_from_env()?;
    let pool = Pool::new(PostgresDriver::new(), endpoint, PoolConfig::default()).await;
    *guard = Some(pool.clone());
    Ok(pool)
}

/// Runs `f` against a connection leased from the process-wide pool,
/// building the pool first if this is the first call. Thin forwarder over
/// [`get_pool`] + [`Pool::with_connection`], so callers that only ever
/// touch the singleton never have to thread the intermediate `Pool` handle
/// through themselves.
pub async fn with_connection<F, Fut, T, E>(f: F) -> Result<T, WithConnectionError<E>>
where
    F: FnOnce(&mut <PostgresDriver as Driver>::Connection) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let pool = get_pool().await.map_err(WithConnectionError::Pool)?;
    pool.with_connection(f).await
}

/// A point-in-time snapshot of the process-wide pool's slot table and
/// cumulative counters. Builds the pool first if this is the first call.
pub async fn stats() -> Result<PoolStats, PoolError> {
    Ok(get_pool().await?.stats())
}

/// Shuts down the process-wide pool, if one has been built, and clears the
/// singleton so a subsequent [`get_pool`] builds a fresh instance.
///
/// Intended for graceful process shutdown and for test suites that need an
/// isolated pool per test.
pub async fn shutdown() {
    let mut guard = POOL.lock().await;
    if let Some(pool) = guard.take() {
        pool.shutdown().await;
    }
}

// Exercising any of these functions directly requires a reachable Postgres
// server (the singleton is fixed to `PostgresDriver`, unlike `Pool<D>`
// itself). That behavior — idempotent construction under a guarding mutex,
// forwarding to the built pool, and re-initialization after shutdown — is
// covered generically against `MockDriver` in `pool::tests` instead; this
// module stays a thin, untested wrapper around it.
