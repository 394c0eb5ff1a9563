//! ts-hashmap: a fixed-capacity, separately chained hash map shared across
//! threads behind a writer-preferring reader-writer monitor.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: many concurrent lookups alongside serialized mutations, with a
//!   structure simple enough to reason about by inspection.
//! - Layers:
//!   - RwMonitor: mutex plus two condition variables. Readers share, a
//!     writer is exclusive, and a waiting writer blocks newly arriving
//!     readers.
//!   - ChainTable<K, V>: unsynchronized structural layer; a fixed array of
//!     bucket heads and an arena of chain nodes linked by generational keys.
//!   - TsHashMap<K, V, H>: public API; acquires the monitor around every
//!     operation and routes keys to buckets through a `BucketHasher`.
//!
//! Constraints
//! - Capacity is fixed at construction. `resize` is declared but inert.
//! - Coarse-grained: one monitor guards every bucket.
//! - Values are copied out on lookup (`V: Clone`); no references escape the
//!   lock.
//! - Blocking only: no timeouts, no try-lock, no async.
//!
//! Why this split?
//! - The chain layer can be tested exhaustively without threads.
//! - Unsafe is limited to turning a monitor guard into a table reference in
//!   `TsHashMap`; the chain layer is safe Rust over `slotmap`.
//!
//! Hash strategies
//! - `ModuloHasher` (default) reduces integer keys modulo capacity; suited
//!   to small integer workloads only.
//! - `BuildHasherBuckets` reduces any `BuildHasher` output.
//! - Any `Fn(&K, usize) -> usize` closure is accepted.
//!
//! Observation
//! - The map writes no output of its own. An optional `MapObserver` sees
//!   construction, drop and insert failures; `LogObserver` forwards them to
//!   the `log` facade.
//!
//! Misuse
//! - The monitor is not reentrant. Calling into a map from an observer
//!   callback, or from a key/value destructor run by `clear`, deadlocks.

pub mod bucket_hasher;
mod chain_table;
mod error;
pub mod observer;
pub mod rw_monitor;
mod ts_hash_map;
mod ts_hash_map_proptest;

// Public surface
pub use bucket_hasher::{BucketHasher, BuildHasherBuckets, ModuloHasher, ModuloKey};
pub use error::{BuildError, InsertError};
pub use observer::{LogObserver, MapObserver};
pub use rw_monitor::{MonitorState, ReadGuard, RwMonitor, WriteGuard};
pub use ts_hash_map::{TsHashMap, TsHashMapBuilder, DEFAULT_CAPACITY};
