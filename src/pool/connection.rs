//! The RAII lease guard handed back by [`Pool::acquire`][super::Pool::acquire].

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::driver::Driver;
use crate::pool::inner::SharedPool;
use crate::pool::permit::Permit;
use crate::pool::slot::Slot;

/// A leased connection. Derefs to the driver's connection type; releases
/// the underlying slot back to the pool when dropped, regardless of whether
/// the drop happens via normal scope exit, an early return, a panic
/// unwinding through it, or the enclosing future being cancelled (spec §5,
/// Testable Property 3).
pub struct PoolConnection<D: Driver> {
    // Always `Some` except during the brief window inside `Drop::drop`.
    slot: Option<Slot<D>>,
    permit: Option<Permit>,
    pool: Arc<SharedPool<D>>,
}

impl<D: Driver> PoolConnection<D> {
    pub(crate) fn new(slot: Slot<D>, pool: Arc<SharedPool<D>>, permit: Permit) -> Self {
        Self {
            slot: Some(slot),
            permit: Some(permit),
            pool,
        }
    }

    /// The id of the underlying slot. Crate-internal: callers never see
    /// slot ids, only the leased connection itself.
    pub(crate) fn slot_id(&self) -> u64 {
        self.slot.as_ref().expect("slot is only taken during drop").id
    }
}

impl<D: Driver> Deref for PoolConnection<D> {
    type Target = D::Connection;

    fn deref(&self) -> &Self::Target {
        self.slot
            .as_ref()
            .expect("slot is only taken during drop")
            .connection()
    }
}

impl<D: Driver> DerefMut for PoolConnection<D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.slot
            .as_mut()
            .expect("slot is only taken during drop")
            .connection_mut()
    }
}

impl<D: Driver> Drop for PoolConnection<D> {
    fn drop(&mut self) {
        let slot = self.slot.take().expect("slot is only taken once, here");
        let permit = self.permit.take().expect("permit is only taken once, here");
        self.pool.release(slot.id, slot, permit);
    }
}
