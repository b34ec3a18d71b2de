//! Hands out a fixed number of production permits across any number of threads.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;

use crate::error::{Error, Result};

/// Shared production counter bounded by a target.
///
/// Each successful [`claim_next`](Coordinator::claim_next) returns a distinct
/// sequence number in `0..target`; once all of them are handed out every
/// caller gets `None` and the counter never moves again.
#[derive(Debug)]
pub struct Coordinator {
    produced: AtomicUsize,
    target: usize,
}

impl Coordinator {
    /// # Errors
    ///
    /// [`Error::ZeroTargetCount`] if `target` is 0.
    pub fn new(target: usize) -> Result<Self> {
        if target == 0 {
            return Err(Error::ZeroTargetCount);
        }
        Ok(Self {
            produced: AtomicUsize::new(0),
            target,
        })
    }

    /// Claim the next sequence number, or `None` once the target is reached.
    ///
    /// Check and increment happen in one compare-and-swap, so no two callers
    /// ever see the same value and the count never passes the target.
    pub fn claim_next(&self) -> Option<usize> {
        let mut current = self.produced.load(Ordering::Acquire);
        loop {
            if current >= self.target {
                return None;
            }
            match self.produced.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    trace!("claimed permit {}/{}", current + 1, self.target);
                    return Some(current);
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    /// Permits handed out so far.
    pub fn claimed(&self) -> usize {
        self.produced.load(Ordering::Acquire)
    }

    pub fn is_exhausted(&self) -> bool {
        self.claimed() >= self.target
    }
}
