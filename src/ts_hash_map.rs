//! TsHashMap: chained hash map guarded by one writer-preferring monitor.
//!
//! Every public operation acquires the monitor before touching the table:
//! write mode for `insert`, `remove` and `clear`; read mode for everything
//! else, including `len` and `capacity`. Locking is whole-table, so two
//! mutations on different buckets still serialize.
//!
//! Unsafe is confined to `shared`/`exclusive`, which turn a monitor guard into
//! a reference to the table.

use crate::bucket_hasher::{BucketHasher, ModuloHasher};
use crate::chain_table::ChainTable;
use crate::error::{BuildError, InsertError};
use crate::observer::MapObserver;
use crate::rw_monitor::{ReadGuard, RwMonitor, WriteGuard};
use core::cell::UnsafeCell;
use core::fmt;

/// Bucket count used when a map is requested with zero capacity.
pub const DEFAULT_CAPACITY: usize = 10;

fn effective_capacity(requested: usize) -> usize {
    if requested == 0 {
        DEFAULT_CAPACITY
    } else {
        requested
    }
}

/// A fixed-capacity concurrent hash map with separate chaining.
///
/// # Examples
///
/// ```rust
/// use ts_hashmap::TsHashMap;
///
/// let map: TsHashMap<u32, u32> = TsHashMap::new(10);
/// for k in 1..=5 {
///     map.insert(k, k * 10).unwrap();
/// }
/// assert_eq!(map.get(&3), Some(30));
/// assert_eq!(map.remove(&3), Some(30));
/// assert_eq!(map.get(&3), None);
/// assert_eq!(map.len(), 4);
/// ```
pub struct TsHashMap<K, V, H = ModuloHasher> {
    monitor: RwMonitor,
    table: UnsafeCell<ChainTable<K, V>>,
    hasher: H,
    observer: Option<Box<dyn MapObserver>>,
}

// Readers on different threads share `&K`/`&V`; writers move `K`/`V` in and
// out from whichever thread calls them.
unsafe impl<K, V, H> Sync for TsHashMap<K, V, H>
where
    K: Send + Sync,
    V: Send + Sync,
    H: Sync,
{
}

impl<K, V> TsHashMap<K, V> {
    /// Map with `capacity` buckets (0 selects `DEFAULT_CAPACITY`) and the
    /// modulo strategy.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, ModuloHasher)
    }

    pub fn try_new(capacity: usize) -> Result<Self, BuildError> {
        Self::try_with_hasher(capacity, ModuloHasher)
    }
}

impl<K, V> Default for TsHashMap<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V, H> TsHashMap<K, V, H> {
    pub fn with_hasher(capacity: usize, hasher: H) -> Self {
        let table = ChainTable::with_buckets(effective_capacity(capacity));
        Self::from_parts(table, hasher, None)
    }

    pub fn try_with_hasher(capacity: usize, hasher: H) -> Result<Self, BuildError> {
        let table = ChainTable::try_with_buckets(effective_capacity(capacity))?;
        Ok(Self::from_parts(table, hasher, None))
    }

    fn from_parts(
        table: ChainTable<K, V>,
        hasher: H,
        observer: Option<Box<dyn MapObserver>>,
    ) -> Self {
        if let Some(o) = &observer {
            o.created(table.buckets());
        }
        Self {
            monitor: RwMonitor::new(),
            table: UnsafeCell::new(table),
            hasher,
            observer,
        }
    }

    fn shared<'g>(&'g self, guard: &'g ReadGuard<'_>) -> &'g ChainTable<K, V> {
        debug_assert!(guard.is_for(&self.monitor));
        // SAFETY: the guard holds this map's monitor in read mode, so no
        // writer can hold it and no `&mut` to the table exists while the
        // returned borrow (tied to the guard) is alive.
        unsafe { &*self.table.get() }
    }

    fn exclusive<'g>(&'g self, guard: &'g mut WriteGuard<'_>) -> &'g mut ChainTable<K, V> {
        debug_assert!(guard.is_for(&self.monitor));
        // SAFETY: the guard holds this map's monitor in write mode, so no
        // other thread can reach the table, and borrowing the guard mutably
        // prevents a second `&mut` on this thread.
        unsafe { &mut *self.table.get() }
    }

    /// Number of buckets. Fixed for the lifetime of the map.
    pub fn capacity(&self) -> usize {
        let guard = self.monitor.read();
        self.shared(&guard).buckets()
    }

    /// Number of live entries. Advisory while other threads mutate.
    pub fn len(&self) -> usize {
        let guard = self.monitor.read();
        self.shared(&guard).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every entry. Returns how many were released.
    ///
    /// Entry destructors run while the write lock is held and must not touch
    /// this map.
    pub fn clear(&self) -> usize {
        let mut guard = self.monitor.write();
        self.exclusive(&mut guard).clear()
    }

    /// Growth is not supported: always reports success and leaves capacity
    /// and layout unchanged.
    pub fn resize(&self, _new_capacity: usize) -> bool {
        true
    }

    /// Visit every entry by bucket index, then chain order, under a single
    /// read acquisition. Writers wait for the whole traversal.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(usize, &K, &V),
    {
        let guard = self.monitor.read();
        for (bucket, k, v) in self.shared(&guard).iter() {
            f(bucket, k, v);
        }
    }

    /// Owned copy of every entry as `(bucket, key, value)`, in `for_each`
    /// order.
    pub fn snapshot(&self) -> Vec<(usize, K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let guard = self.monitor.read();
        let table = self.shared(&guard);
        let mut out = Vec::with_capacity(table.len());
        out.extend(table.iter().map(|(b, k, v)| (b, k.clone(), v.clone())));
        out
    }
}

impl<K, V, H> TsHashMap<K, V, H>
where
    K: Eq,
    H: BucketHasher<K>,
{
    fn bucket_of(&self, key: &K, capacity: usize) -> usize {
        let b = self.hasher.bucket(key, capacity);
        if b < capacity {
            b
        } else {
            b % capacity
        }
    }

    /// Insert `key`, or overwrite its value if present.
    ///
    /// Returns the previous value on update and `None` for a new entry.
    pub fn insert(&self, key: K, value: V) -> Result<Option<V>, InsertError> {
        let mut guard = self.monitor.write();
        let table = self.exclusive(&mut guard);
        let bucket = self.bucket_of(&key, table.buckets());
        let res = table.upsert(bucket, key, value);
        if let (Err(e), Some(o)) = (&res, &self.observer) {
            o.insert_failed(e);
        }
        res
    }

    /// Remove `key`, returning its value. `None` is a normal miss.
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = {
            let mut guard = self.monitor.write();
            let table = self.exclusive(&mut guard);
            let bucket = self.bucket_of(key, table.buckets());
            table.remove(bucket, key)
        };
        // The key is dropped after the monitor is released.
        removed.map(|(_k, v)| v)
    }

    /// Copy of the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let guard = self.monitor.read();
        let table = self.shared(&guard);
        table.get(self.bucket_of(key, table.buckets()), key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let guard = self.monitor.read();
        let table = self.shared(&guard);
        table.get(self.bucket_of(key, table.buckets()), key).is_some()
    }
}

impl<K, V, H> Drop for TsHashMap<K, V, H> {
    fn drop(&mut self) {
        let released = self.table.get_mut().clear();
        if let Some(o) = &self.observer {
            o.dropped(released);
        }
    }
}

impl<K, V, H> fmt::Debug for TsHashMap<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.monitor.read();
        let table = self.shared(&guard);
        f.debug_struct("TsHashMap")
            .field("capacity", &table.buckets())
            .field("len", &table.len())
            .field("entries", &Entries(table))
            .finish()
    }
}

struct Entries<'a, K, V>(&'a ChainTable<K, V>);

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entries<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(_, k, v)| (k, v)))
            .finish()
    }
}

/// Collects construction options for `TsHashMap`.
pub struct TsHashMapBuilder<H = ModuloHasher> {
    capacity: usize,
    hasher: H,
    observer: Option<Box<dyn MapObserver>>,
}

impl TsHashMapBuilder {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            hasher: ModuloHasher,
            observer: None,
        }
    }
}

impl Default for TsHashMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> TsHashMapBuilder<H> {
    /// Bucket count; 0 selects `DEFAULT_CAPACITY`.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn hasher<H2>(self, hasher: H2) -> TsHashMapBuilder<H2> {
        TsHashMapBuilder {
            capacity: self.capacity,
            hasher,
            observer: self.observer,
        }
    }

    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: MapObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn build<K, V>(self) -> Result<TsHashMap<K, V, H>, BuildError> {
        let table = ChainTable::try_with_buckets(effective_capacity(self.capacity))?;
        Ok(TsHashMap::from_parts(table, self.hasher, self.observer))
    }
}

impl<H> fmt::Debug for TsHashMapBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsHashMapBuilder")
            .field("capacity", &self.capacity)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
