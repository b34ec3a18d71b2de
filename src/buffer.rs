//! Fixed-capacity FIFO buffer with blocking, cancellable deposit and fetch.
//!
//! The buffer is a monitor: one `Mutex` guards the queue, and two condition
//! variables (`not_full`, `not_empty`) park producers and consumers. Every
//! wait sits in a loop that re-checks its predicate after waking, so spurious
//! wakeups and stolen slots are harmless.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};

use log::trace;

use crate::cancel::{CancellationToken, Interrupt};
use crate::error::{Cancelled, DepositCancelled, Error, Result};

struct Shared<T> {
    items: Mutex<VecDeque<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> Shared<T> {
    // Every operation leaves the queue consistent before it can panic, so a
    // poisoned lock still guards valid state.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send> Interrupt for Shared<T> {
    fn interrupt(&self) {
        let _items = self.lock();
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

/// Bounded blocking queue shared between producer and consumer threads.
///
/// Cloning is cheap and yields another handle to the same queue.
pub struct BoundedBuffer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BoundedBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> BoundedBuffer<T> {
    /// Create an empty buffer holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self {
            shared: Arc::new(Shared {
                items: Mutex::new(VecDeque::with_capacity(capacity)),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                capacity,
            }),
        })
    }

    /// Append `item` at the tail, blocking while the buffer is full.
    ///
    /// Cancellation is only observed while waiting for space; on cancellation
    /// the item is returned inside the error.
    pub fn deposit(
        &self,
        item: T,
        token: &CancellationToken,
    ) -> std::result::Result<(), DepositCancelled<T>> {
        let mut items = self.shared.lock();
        let mut subscribed = false;
        while items.len() >= self.shared.capacity {
            if !subscribed {
                token.subscribe(self.monitor());
                subscribed = true;
            }
            if token.is_cancelled() {
                trace!("deposit abandoned: cancelled while buffer full");
                return Err(DepositCancelled(item));
            }
            trace!("buffer full ({}), waiting for space", self.shared.capacity);
            items = self
                .shared
                .not_full
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
        items.push_back(item);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Remove and return the head item, blocking while the buffer is empty.
    ///
    /// Returns [`Cancelled`] without consuming anything if `token` is
    /// cancelled while waiting.
    pub fn fetch(&self, token: &CancellationToken) -> std::result::Result<T, Cancelled> {
        let mut items = self.shared.lock();
        let mut subscribed = false;
        loop {
            if let Some(item) = items.pop_front() {
                self.shared.not_full.notify_one();
                return Ok(item);
            }
            if !subscribed {
                token.subscribe(self.monitor());
                subscribed = true;
            }
            if token.is_cancelled() {
                trace!("fetch abandoned: cancelled while buffer empty");
                return Err(Cancelled);
            }
            trace!("buffer empty, waiting for an item");
            items = self
                .shared
                .not_empty
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Deposit without blocking; hands the item back if the buffer is full.
    pub fn try_deposit(&self, item: T) -> std::result::Result<(), T> {
        let mut items = self.shared.lock();
        if items.len() >= self.shared.capacity {
            return Err(item);
        }
        items.push_back(item);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Fetch without blocking.
    pub fn try_fetch(&self) -> Option<T> {
        let mut items = self.shared.lock();
        let item = items.pop_front()?;
        self.shared.not_full.notify_one();
        Some(item)
    }

    fn monitor(&self) -> Weak<dyn Interrupt> {
        Arc::downgrade(&self.shared) as Weak<dyn Interrupt>
    }
}

impl<T> BoundedBuffer<T> {
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Current occupancy.
    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.shared.capacity
    }
}

impl<T> fmt::Debug for BoundedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBuffer")
            .field("capacity", &self.shared.capacity)
            .field("len", &self.len())
            .finish()
    }
}
