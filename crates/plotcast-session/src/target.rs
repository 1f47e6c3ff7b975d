use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

/// Thread-safe accessor for the single subscriber target.
///
/// The publisher loop and the control receiver each hold a clone; the
/// mutex guarantees neither ever observes a torn address value. `get`,
/// `set` and `take` are the only mutation points.
#[derive(Debug, Clone, Default)]
pub struct TargetHandle {
    inner: Arc<Mutex<Option<SocketAddr>>>,
}

impl TargetHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current target, if a subscriber is connected.
    pub fn get(&self) -> Option<SocketAddr> {
        *self.lock()
    }

    /// Install a new target, replacing any existing one.
    pub fn set(&self, addr: SocketAddr) {
        *self.lock() = Some(addr);
    }

    /// Remove and return the current target.
    pub fn take(&self) -> Option<SocketAddr> {
        self.lock().take()
    }

    /// True when a subscriber is connected.
    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SocketAddr>> {
        // A poisoned lock can only leave a stale Option behind, which the
        // next set/take overwrites; recover rather than propagate.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
