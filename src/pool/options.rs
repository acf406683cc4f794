//! Configuration for [`Pool`][super::Pool], grounded in the shape of
//! `sqlx-core`'s `PoolOptions` builder (`pool/options.rs`): a
//! method-chaining builder with a `Default` impl providing "sane" values
//! suitable for light-duty use.

use std::time::Duration;

/// Configuration options for [`Pool`][super::Pool].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub(crate) base_size: u32,
    pub(crate) overflow: u32,
    pub(crate) connection_timeout: Duration,
    pub(crate) max_idle_time: Duration,
    pub(crate) health_check_interval: Duration,
    pub(crate) max_lifetime: Duration,
    pub(crate) retry_attempts: u32,
    pub(crate) retry_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolConfig {
    /// Returns a default "sane" configuration, suitable for light-duty
    /// applications and tests. Production applications will likely want to
    /// at least raise [`base_size`][Self::base_size] and
    /// [`overflow`][Self::overflow].
    pub fn new() -> Self {
        Self {
            base_size: 5,
            overflow: 5,
            connection_timeout: Duration::from_secs(30),
            max_idle_time: Duration::from_secs(10 * 60),
            health_check_interval: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(30 * 60),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(200),
        }
    }

    /// The number of slots created eagerly, in parallel, at pool
    /// construction.
    pub fn base_size(mut self, base_size: u32) -> Self {
        self.base_size = base_size;
        self
    }

    /// The number of additional slots the pool may create on demand, above
    /// `base_size`, before `acquire` must wait for one to free up.
    ///
    /// `max_total = base_size + overflow` is the bound the fair permit
    /// counter enforces.
    pub fn overflow(mut self, overflow: u32) -> Self {
        self.overflow = overflow;
        self
    }

    /// The maximum total number of slots: `base_size + overflow`.
    pub fn max_total(&self) -> u32 {
        self.base_size + self.overflow
    }

    /// The maximum time `acquire`/`with_connection` will wait for a slot
    /// before returning [`PoolError::AcquisitionTimeout`][crate::error::PoolError::AcquisitionTimeout].
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// How long a slot may sit `Idle` before the maintainer reclaims it.
    pub fn max_idle_time(mut self, max_idle_time: Duration) -> Self {
        self.max_idle_time = max_idle_time;
        self
    }

    /// How often the maintainer wakes to run a health pass and a cleanup
    /// pass over the slot table.
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// The maximum age of a slot before it becomes rotate-eligible.
    /// A rotate-eligible slot is never handed out by `acquire`, even if
    /// idle, and is reclaimed by the next maintenance cleanup pass.
    pub fn max_lifetime(mut self, max_lifetime: Duration) -> Self {
        self.max_lifetime = max_lifetime;
        self
    }

    /// The number of attempts `Slot::establish` makes before giving up and
    /// recording a `Failed` slot.
    pub fn retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    /// The fixed delay between connection-establishment retry attempts.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}
