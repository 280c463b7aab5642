//! Object pool backed by a bounded free list
//!
//! Acquired values are owned exclusively by the borrower. Released values
//! are reset through [`Recycle`] before they become visible to the next
//! borrower. When the free list is full, released values are dropped.

use crossbeam_channel::{bounded, Receiver, Sender};

/// Reset hook run when a value goes back into a [`Pool`]
pub trait Recycle {
    fn recycle(&mut self);
}

/// Byte buffers above this capacity are shrunk before reuse
pub const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

impl Recycle for Vec<u8> {
    fn recycle(&mut self) {
        self.clear();
        if self.capacity() > MAX_RETAINED_CAPACITY {
            self.shrink_to(MAX_RETAINED_CAPACITY);
        }
    }
}

pub struct Pool<T> {
    release: Sender<T>,
    acquire: Receiver<T>,
    factory: fn() -> T,
}

impl<T: Recycle> Pool<T> {
    /// Create a pool retaining at most `capacity` idle values
    pub fn new(capacity: usize, factory: fn() -> T) -> Self {
        let (release, acquire) = bounded(capacity.max(1));
        Self {
            release,
            acquire,
            factory,
        }
    }

    /// Take an idle value, or build a fresh one when none is idle
    pub fn get(&self) -> T {
        self.acquire
            .try_recv()
            .unwrap_or_else(|_| (self.factory)())
    }

    /// Reset `value` and return it to the free list
    pub fn put(&self, mut value: T) {
        value.recycle();
        let _ = self.release.try_send(value);
    }

    /// Number of idle values currently retained
    pub fn idle(&self) -> usize {
        self.acquire.len()
    }

    pub fn capacity(&self) -> usize {
        self.release.capacity().unwrap_or(0)
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.acquire.len())
            .field("capacity", &self.release.capacity())
            .finish()
    }
}
