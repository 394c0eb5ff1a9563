//! RwMonitor: writer-preferring reader-writer monitor.
//!
//! One mutex guards every counter; the two condition variables are plain wait
//! queues (one for readers, one for writers) whose predicates are re-checked
//! in a loop after each wakeup.
//!
//! Fairness
//! - A reader waits while a writer holds the monitor *or* while any writer is
//!   waiting. A continuous stream of short reads therefore cannot starve a
//!   writer.
//! - The converse is not bounded: a steady stream of writers can stall
//!   readers indefinitely.
//!
//! Preconditions
//! - Non-reentrant. Acquiring write while holding read or write on the same
//!   monitor deadlocks. This is not detected.
//! - `release` must be paired with a prior successful acquire. Prefer the
//!   `read`/`write` guards, which pair them automatically.

use parking_lot::{Condvar, Mutex};

/// Counters guarded by the monitor's mutex.
///
/// `active > 0`: that many readers hold the monitor. `active == 0`: idle.
/// `active == -1`: a single writer holds it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct MonitorState {
    pub active: isize,
    pub pending_readers: usize,
    pub pending_writers: usize,
}

impl MonitorState {
    pub fn is_write_held(&self) -> bool {
        self.active < 0
    }

    pub fn readers(&self) -> usize {
        if self.active > 0 {
            self.active as usize
        } else {
            0
        }
    }
}

#[derive(Debug, Default)]
pub struct RwMonitor {
    state: Mutex<MonitorState>,
    readers: Condvar,
    writers: Condvar,
}

impl RwMonitor {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(MonitorState {
                active: 0,
                pending_readers: 0,
                pending_writers: 0,
            }),
            readers: Condvar::new(),
            writers: Condvar::new(),
        }
    }

    /// Block until the monitor is held for reading.
    pub fn acquire_read(&self) {
        let mut s = self.state.lock();
        s.pending_readers += 1;
        while s.active < 0 || s.pending_writers > 0 {
            self.readers.wait(&mut s);
        }
        s.pending_readers -= 1;
        s.active += 1;
    }

    /// Block until the monitor is held exclusively.
    pub fn acquire_write(&self) {
        let mut s = self.state.lock();
        s.pending_writers += 1;
        while s.active != 0 {
            self.writers.wait(&mut s);
        }
        s.pending_writers -= 1;
        s.active = -1;
    }

    /// Release one unit of whatever the caller holds.
    pub fn release(&self) {
        let mut s = self.state.lock();
        if s.active > 0 {
            s.active -= 1;
            // Readers never wait unless a writer holds or waits, so only a
            // writer can be unblocked by the last reader leaving.
            if s.active == 0 {
                self.writers.notify_one();
            }
        } else {
            debug_assert!(s.active == -1, "release without a matching acquire");
            s.active = 0;
            if s.pending_writers > 0 {
                self.writers.notify_one();
            } else if s.pending_readers > 0 {
                self.readers.notify_all();
            }
        }
    }

    /// Acquire for reading; released when the guard drops.
    #[inline]
    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard { monitor: self }
    }

    /// Acquire for writing; released when the guard drops.
    #[inline]
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard { monitor: self }
    }

    /// Snapshot of the counters. Stale as soon as it is returned.
    pub fn state(&self) -> MonitorState {
        *self.state.lock()
    }
}

/// Proof that the monitor is held for reading.
#[must_use = "the read acquisition is released when the guard drops"]
#[derive(Debug)]
pub struct ReadGuard<'a> {
    monitor: &'a RwMonitor,
}

impl<'a> ReadGuard<'a> {
    /// Whether this guard was issued by `monitor`.
    pub fn is_for(&self, monitor: &RwMonitor) -> bool {
        core::ptr::eq(self.monitor, monitor)
    }
}

impl<'a> Drop for ReadGuard<'a> {
    fn drop(&mut self) {
        self.monitor.release();
    }
}

/// Proof that the monitor is held exclusively.
#[must_use = "the write acquisition is released when the guard drops"]
#[derive(Debug)]
pub struct WriteGuard<'a> {
    monitor: &'a RwMonitor,
}

impl<'a> WriteGuard<'a> {
    /// Whether this guard was issued by `monitor`.
    pub fn is_for(&self, monitor: &RwMonitor) -> bool {
        core::ptr::eq(self.monitor, monitor)
    }
}

impl<'a> Drop for WriteGuard<'a> {
    fn drop(&mut self) {
        self.monitor.release();
    }
}
