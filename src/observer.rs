//! Optional observation hooks for map lifecycle events.
//!
//! The map itself never writes output. Attach a `MapObserver` to see
//! construction, teardown and insert failures; `LogObserver` forwards them to
//! the `log` facade.

use crate::error::InsertError;
use log::{error, info};
use std::sync::Arc;

/// Receives map events. Every method defaults to doing nothing.
///
/// Callbacks run while the map holds its monitor (write mode for
/// `insert_failed`) and must not call back into the same map.
pub trait MapObserver: Send + Sync {
    /// A map with `capacity` buckets was constructed.
    fn created(&self, _capacity: usize) {}

    /// A map was dropped after releasing `released` entries.
    fn dropped(&self, _released: usize) {}

    /// `insert` could not create a new entry.
    fn insert_failed(&self, _error: &InsertError) {}
}

/// Lets callers keep a handle on an observer they attach to a map.
impl<O: MapObserver + ?Sized> MapObserver for Arc<O> {
    fn created(&self, capacity: usize) {
        (**self).created(capacity)
    }

    fn dropped(&self, released: usize) {
        (**self).dropped(released)
    }

    fn insert_failed(&self, error: &InsertError) {
        (**self).insert_failed(error)
    }
}

/// Forwards events to `log` under a fixed target.
#[derive(Clone, Debug)]
pub struct LogObserver {
    target: &'static str,
}

impl LogObserver {
    pub const DEFAULT_TARGET: &'static str = "ts_hashmap";

    pub fn new() -> Self {
        Self::with_target(Self::DEFAULT_TARGET)
    }

    pub fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl MapObserver for LogObserver {
    fn created(&self, capacity: usize) {
        info!(target: self.target, "hash map created with {capacity} buckets");
    }

    fn dropped(&self, released: usize) {
        info!(target: self.target, "hash map dropped, released {released} entries");
    }

    fn insert_failed(&self, error: &InsertError) {
        error!(target: self.target, "insert failed: {error}");
    }
}
