//! The background maintainer task (spec §4.5): periodically probes idle
//! slots and evicts ones that have failed, aged out, or sat idle too long.
//!
//! Grounded in `sqlx-core`'s `conn_reaper` (`pool/inner.rs`): a loop woken on
//! a fixed interval, racing against a shutdown signal, that never holds the
//! pool's mutex across an `.await`.

use std::sync::Arc;

use crate::driver::Driver;
use crate::pool::inner::SharedPool;

pub(crate) fn spawn<D: Driver>(pool: Arc<SharedPool<D>>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let interval = pool.options().health_check_interval;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = pool.shutdown_notify.notified() => {
                    tracing::debug!(target: "pool::maintainer", "shutting down");
                    break;
                }
            }

            if pool.closed.load(std::sync::atomic::Ordering::Acquire) {
                break;
            }

            tracing::debug!(target: "pool::maintainer", "running maintenance pass");
            pool.health_pass().await;
            pool.cleanup_pass();
        }
    })
}
