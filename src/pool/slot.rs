//! The connection slot and its lifecycle (establish, probe, rotate, close).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::driver::Driver;
use crate::error::DriverError;
use crate::pool::options::PoolConfig;

/// A slot's lifecycle state. The transitions allowed between these are
/// enumerated in `DESIGN.md`/spec §3 and enforced by `SlotTable`, not by
/// this type itself.
pub enum SlotState {
    Idle(Instant),
    Active(Instant),
    Failed(Instant, Arc<DriverError>),
    /// Transient placeholder while a maintenance probe is outstanding for
    /// this slot; kept (not removed) by the cleanup pass per spec §4.5.
    HealthCheck,
}

/// Either a live driver connection, or the error that prevented one from
/// being established.
enum Handle<D: Driver> {
    Live(D::Connection),
    Failed,
}

/// One pool-owned record: a connection (or the record of why it doesn't
/// have one) plus its lifecycle bookkeeping.
pub struct Slot<D: Driver> {
    pub id: u64,
    handle: Handle<D>,
    pub state: SlotState,
    pub created_at: Instant,
    pub last_used: Instant,
    pub use_count: u64,
}

impl<D: Driver> Slot<D> {
    /// Attempts to obtain a new driver connection for `endpoint`, retrying
    /// up to `config.retry_attempts` times with a fixed delay between
    /// attempts (spec §4.2). On exhaustion, returns a slot in `Failed`
    /// state rather than an error directly, so the caller can still insert
    /// it into the slot table for the maintainer to evict later.
    pub async fn establish(id: u64, driver: &D, endpoint: &crate::endpoint::Endpoint, config: &PoolConfig) -> Self {
        Self::establish_tracked(id, driver, endpoint, config, |_attempt| {}).await
    }

    /// Same as [`Self::establish`], invoking `on_failed_attempt` once per
    /// failed attempt (including ones followed by a successful retry) so
    /// the caller can tally a pool-wide establishment-failure counter.
    pub async fn establish_tracked(
        id: u64,
        driver: &D,
        endpoint: &crate::endpoint::Endpoint,
        config: &PoolConfig,
        mut on_failed_attempt: impl FnMut(u32),
    ) -> Self {
        let attempts = config.retry_attempts.max(1);

        for attempt in 1..=attempts {
            match driver.connect(endpoint).await {
                Ok(conn) => {
                    let now = Instant::now();
                    tracing::debug!(target: "pool::slot", slot_id = id, attempt, "connection established");
                    return Self {
                        id,
                        handle: Handle::Live(conn),
                        state: SlotState::Idle(now),
                        created_at: now,
                        last_used: now,
                        use_count: 0,
                    };
                }
                Err(error) => {
                    let remaining = attempts - attempt;
                    tracing::warn!(
                        target: "pool::slot",
                        slot_id = id,
                        attempt,
                        remaining,
                        %error,
                        "connection attempt failed"
                    );
                    on_failed_attempt(attempt);

                    if remaining > 0 {
                        tokio::time::sleep(config.retry_delay).await;
                    } else {
                        tracing::error!(target: "pool::slot", slot_id = id, %error, "exhausted retries establishing connection");
                        let now = Instant::now();
                        return Self {
                            id,
                            handle: Handle::Failed,
                            state: SlotState::Failed(now, Arc::new(error)),
                            created_at: now,
                            last_used: now,
                            use_count: 0,
                        };
                    }
                }
            }
        }

        unreachable!("loop always returns on its final iteration")
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.handle, Handle::Failed)
    }

    pub fn failure(&self) -> Option<Arc<DriverError>> {
        match &self.state {
            SlotState::Failed(_, error) => Some(Arc::clone(error)),
            _ => None,
        }
    }

    /// True iff this slot's age exceeds `max_lifetime`. A rotate-eligible
    /// slot must never be handed out by `acquire`, even if idle.
    pub fn is_rotation_eligible(&self, max_lifetime: Duration) -> bool {
        self.created_at.elapsed() > max_lifetime
    }

    /// Executes a minimal liveness query. Only meaningful for `Idle`/`Failed`
    /// slots; callers must not probe an `Active` slot (spec §4.2).
    pub async fn probe(&mut self, driver: &D) -> bool {
        match &mut self.handle {
            Handle::Live(conn) => driver.probe(conn).await,
            Handle::Failed => false,
        }
    }

    pub fn mark_active(&mut self) {
        let now = Instant::now();
        self.state = SlotState::Active(now);
        self.last_used = now;
        self.use_count += 1;
    }

    pub fn mark_idle(&mut self) {
        let now = Instant::now();
        self.state = SlotState::Idle(now);
        self.last_used = now;
    }

    /// Borrows the live connection for the duration of a lease. Panics if
    /// called on a `Failed` slot — callers must check `is_failed()` first,
    /// which every call site in `pool::inner` does before handing a slot out.
    pub fn connection(&self) -> &D::Connection {
        match &self.handle {
            Handle::Live(conn) => conn,
            Handle::Failed => unreachable!("(bug) attempted to use a failed slot's connection"),
        }
    }

    /// Mutable counterpart of [`Self::connection`].
    pub fn connection_mut(&mut self) -> &mut D::Connection {
        match &mut self.handle {
            Handle::Live(conn) => conn,
            Handle::Failed => unreachable!("(bug) attempted to use a failed slot's connection"),
        }
    }

    /// Releases the driver handle. For a slot holding a live connection this
    /// drops it (closing it, from the driver's perspective); for a `Failed`
    /// slot there is no driver resource to release.
    pub fn close(self) {
        match self.handle {
            Handle::Live(_) => {
                tracing::debug!(target: "pool::slot", slot_id = self.id, "closing connection");
            }
            Handle::Failed => {}
        }
        // `Handle`'s live variant is dropped here along with `self`.
    }
}

/// Whether an idle slot should be reclaimed during a maintenance cleanup
/// pass: either its idle-time exceeds `max_idle_time`, or it has aged past
/// `max_lifetime` regardless of health (spec §4.2/§4.5).
pub fn should_reclaim_idle<D: Driver>(slot: &Slot<D>, idle_since: Instant, config: &PoolConfig) -> bool {
    idle_since.elapsed() > config.max_idle_time || slot.is_rotation_eligible(config.max_lifetime)
}
