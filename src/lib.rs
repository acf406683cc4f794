//! A bounded, health-checked, lifetime-managed connection pool.
//!
//! The pool is generic over a narrow [`Driver`] collaborator (§see
//! [`driver`]), so it never depends on any particular wire protocol beyond
//! the production [`driver::PostgresDriver`] this crate ships. Connections
//! are leased through [`Pool::acquire`] or [`Pool::with_connection`] and
//! returned automatically when the lease guard drops, including on panic or
//! cancellation.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use insurance_db_pool::{Endpoint, Pool, PoolConfig, driver::PostgresDriver};
//!
//! let endpoint = Endpoint::resolve_from_env()?;
//! let pool = Pool::new(PostgresDriver::new(), endpoint, PoolConfig::default()).await;
//!
//! let mut conn = pool.acquire().await?;
//! let _ = conn.client.simple_query("SELECT 1").await?;
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod endpoint;
pub mod error;
pub mod pool;
pub mod singleton;

pub use driver::Driver;
pub use endpoint::Endpoint;
pub use error::{ConfigError, DriverError, PoolError, WithConnectionError};
pub use pool::{Pool, PoolConfig, PoolConnection, PoolStats};
