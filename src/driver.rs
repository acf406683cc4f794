//! The narrow collaborator contract between the pool and a concrete
//! database driver (spec §6). The pool only ever calls `connect` and
//! `probe`; everything else about the underlying wire protocol, query
//! execution, and transactions is the caller's concern, not the pool's.

use std::future::Future;

use crate::endpoint::Endpoint;
use crate::error::DriverError;

/// A database driver collaborator.
///
/// Implementations own exactly two responsibilities: opening a connection
/// for a given [`Endpoint`], and answering whether an existing connection
/// is still alive. They must not implement retry, pooling, or rotation —
/// that all belongs to `pool::slot` and `pool::inner`.
pub trait Driver: Send + Sync + 'static {
    /// The live, driver-owned connection handle. Opaque to the pool beyond
    /// being movable between tasks; the pool never inspects its contents.
    type Connection: Send;

    /// Opens a new connection to `endpoint`. A single attempt — the pool is
    /// responsible for retrying on failure (spec §4.2).
    fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> impl Future<Output = Result<Self::Connection, DriverError>> + Send;

    /// Runs a minimal liveness query ("SELECT 1") against `conn`.
    ///
    /// Returns `true` iff the driver accepted the query and it returned the
    /// expected result; any error or unexpected value yields `false`.
    fn probe(&self, conn: &mut Self::Connection) -> impl Future<Output = bool> + Send;
}

/// The production [`Driver`]: a thin wrapper over `tokio-postgres`.
///
/// Intentionally minimal — this owns no retry or pooling logic. That stays
/// in `pool::slot::Slot::establish`, which calls `connect` in a bounded
/// retry loop per spec §4.2.
pub struct PostgresDriver {
    _private: (),
}

impl PostgresDriver {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// A live `tokio-postgres` connection together with the background task
/// that drives its I/O. `tokio_postgres::Client::connect` hands back a
/// `Client` and a `Connection` future that must be polled concurrently;
/// we spawn the latter and keep its `JoinHandle` so it's cancelled when
/// the slot is closed.
pub struct PgConnection {
    pub client: tokio_postgres::Client,
    driver_task: tokio::task::JoinHandle<()>,
}

impl Drop for PgConnection {
    fn drop(&mut self) {
        self.driver_task.abort();
    }
}

impl Driver for PostgresDriver {
    type Connection = PgConnection;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Connection, DriverError> {
        let (client, connection) = tokio_postgres::connect(&endpoint.connection_string(), tokio_postgres::NoTls)
            .await
            .map_err(DriverError::new)?;

        let driver_task = tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::warn!(target: "pool::driver", %error, "postgres connection task ended with an error");
            }
        });

        Ok(PgConnection {
            client,
            driver_task,
        })
    }

    async fn probe(&self, conn: &mut Self::Connection) -> bool {
        match conn.client.simple_query("SELECT 1").await {
            Ok(rows) => rows.iter().any(|message| {
                matches!(
                    message,
                    tokio_postgres::SimpleQueryMessage::Row(row)
                        if row.get(0) == Some("1")
                )
            }),
            Err(error) => {
                tracing::info!(target: "pool::driver", %error, "probe query failed");
                false
            }
        }
    }
}

/// Test-only [`Driver`] that never touches the network, used to exercise
/// the pool's lifecycle, fairness, and timeout behavior deterministically.
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// A fake connection handle. Carries an id so tests can assert that
    /// distinct leases really got distinct underlying connections.
    pub struct MockConnection {
        pub id: usize,
        alive: Arc<std::sync::atomic::AtomicBool>,
    }

    impl MockConnection {
        /// Simulates the connection going bad out-of-band (e.g. the server
        /// closed it); the next probe will observe this and return `false`.
        pub fn kill(&self) {
            self.alive.store(false, Ordering::SeqCst);
        }
    }

    /// A [`Driver`] whose `connect` can be scripted to fail a fixed number
    /// of times before succeeding (Scenario D) and whose probes can be
    /// made to fail on demand.
    pub struct MockDriver {
        next_id: AtomicUsize,
        fail_connects: AtomicUsize,
        connect_attempts: AtomicUsize,
    }

    impl MockDriver {
        pub fn new() -> Self {
            Self {
                next_id: AtomicUsize::new(0),
                fail_connects: AtomicUsize::new(0),
                connect_attempts: AtomicUsize::new(0),
            }
        }

        /// The next `count` calls to `connect` will fail before connections
        /// succeed again.
        pub fn fail_next_connects(&self, count: usize) {
            self.fail_connects.store(count, Ordering::SeqCst);
        }

        pub fn connect_attempts(&self) -> usize {
            self.connect_attempts.load(Ordering::SeqCst)
        }
    }

    impl Default for MockDriver {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Driver for MockDriver {
        type Connection = MockConnection;

        async fn connect(&self, _endpoint: &Endpoint) -> Result<Self::Connection, DriverError> {
            self.connect_attempts.fetch_add(1, Ordering::SeqCst);

            let remaining = self
                .fail_connects
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    n.checked_sub(1)
                });

            if remaining.is_ok() {
                return Err(DriverError::new("simulated connection failure"));
            }

            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            Ok(MockConnection {
                id,
                alive: Arc::new(std::sync::atomic::AtomicBool::new(true)),
            })
        }

        async fn probe(&self, conn: &mut Self::Connection) -> bool {
            conn.alive.load(Ordering::SeqCst)
        }
    }
}
