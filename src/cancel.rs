//! Cooperative cancellation for threads parked on a condition variable.
//!
//! A [`CancellationToken`] is a shared flag plus a list of the monitors that
//! have parked threads under it. `cancel()` raises the flag and then takes
//! each monitor's lock before broadcasting, so a waiter either observes the
//! flag while holding its lock or is already parked when the broadcast lands.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::debug;

/// Something that can wake every thread parked inside it.
pub(crate) trait Interrupt: Send + Sync {
    fn interrupt(&self);
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    subscribers: Mutex<Vec<Weak<dyn Interrupt>>>,
}

/// Cloneable cancellation handle; all clones observe the same flag.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Raise the flag and wake everything parked under this token.
    /// Calling it again is a no-op.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let subscribers = std::mem::take(&mut *self.subscribers());
        debug!("cancellation requested, waking {} monitor(s)", subscribers.len());
        for monitor in subscribers.iter().filter_map(Weak::upgrade) {
            monitor.interrupt();
        }
    }

    /// Guard that cancels this token if it is dropped during a panic, so a
    /// thread that unwinds never leaves its peers parked in the buffer.
    pub fn cancel_on_panic(&self) -> PanicGuard<'_> {
        PanicGuard { token: self }
    }

    /// Register a monitor to be woken on cancellation. Callers hold the
    /// monitor's lock and must re-check `is_cancelled` before parking.
    pub(crate) fn subscribe(&self, monitor: Weak<dyn Interrupt>) {
        let mut subscribers = self.subscribers();
        if subscribers.iter().any(|known| known.ptr_eq(&monitor)) {
            return;
        }
        subscribers.retain(|known| known.strong_count() > 0);
        subscribers.push(monitor);
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Weak<dyn Interrupt>>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returned by [`CancellationToken::cancel_on_panic`].
#[derive(Debug)]
#[must_use = "the token is only cancelled when the guard is dropped while panicking"]
pub struct PanicGuard<'a> {
    token: &'a CancellationToken,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            debug!("thread unwinding, cancelling token");
            self.token.cancel();
        }
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
