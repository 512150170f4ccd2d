//! Per-instance memo store.
//!
//! Uses DashMap so slots of different methods can be read and written
//! concurrently. No shard guard is ever held while a value is computed,
//! which lets a computation call back into the same store.
//!
//! The map itself is created on the first insert. An object that never
//! caches anything carries no shards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::key::ArgKey;
use super::slot::CacheSlot;

/// Point-in-time view of a store's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub presets: u64,
    pub resets: u64,
    pub entries: usize,
}

impl StatsSnapshot {
    /// Fraction of lookups answered from the cache.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct MemoStats {
    hits: AtomicU64,
    misses: AtomicU64,
    presets: AtomicU64,
    resets: AtomicU64,
}

impl Clone for MemoStats {
    fn clone(&self) -> Self {
        let copy = |a: &AtomicU64| AtomicU64::new(a.load(Ordering::Relaxed));
        Self {
            hits: copy(&self.hits),
            misses: copy(&self.misses),
            presets: copy(&self.presets),
            resets: copy(&self.resets),
        }
    }
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    Hit(V),
    Miss,
}

/// Smallest shard count DashMap accepts.
pub const MIN_SHARD_AMOUNT: usize = 2;
/// Upper bound on shards per store.
pub const MAX_SHARD_AMOUNT: usize = 64;
pub const DEFAULT_SHARD_AMOUNT: usize = 4;

/// Round a requested shard count to a power of two in
/// `MIN_SHARD_AMOUNT..=MAX_SHARD_AMOUNT`.
pub fn normalize_shard_amount(requested: usize) -> usize {
    requested
        .clamp(MIN_SHARD_AMOUNT, MAX_SHARD_AMOUNT)
        .next_power_of_two()
}

/// Mapping from method name to its cache slot.
#[derive(Debug, Clone)]
pub struct MemoStore<V> {
    slots: OnceLock<DashMap<String, CacheSlot<V>>>,
    capacity: usize,
    shard_amount: usize,
    stats: MemoStats,
}

impl<V: Clone> MemoStore<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Store with room for `capacity` methods once the map is created.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_shards(capacity, DEFAULT_SHARD_AMOUNT)
    }

    /// Store whose map, once created, uses `shard_amount` shards (rounded by
    /// [`normalize_shard_amount`]).
    pub fn with_capacity_and_shards(capacity: usize, shard_amount: usize) -> Self {
        Self {
            slots: OnceLock::new(),
            capacity,
            shard_amount: normalize_shard_amount(shard_amount),
            stats: MemoStats::default(),
        }
    }

    fn map(&self) -> Option<&DashMap<String, CacheSlot<V>>> {
        self.slots.get()
    }

    fn map_or_init(&self) -> &DashMap<String, CacheSlot<V>> {
        self.slots.get_or_init(|| {
            DashMap::with_capacity_and_shard_amount(self.capacity, self.shard_amount)
        })
    }

    /// Whether the backing map has been created.
    pub fn is_allocated(&self) -> bool {
        self.slots.get().is_some()
    }

    /// Shard count the backing map is (or will be) created with.
    pub fn shard_amount(&self) -> usize {
        self.shard_amount
    }

    /// Look up a cached value, counting the hit or miss.
    pub fn lookup(&self, method: &str, key: Option<&ArgKey>) -> Lookup<V> {
        match self.get(method, key) {
            Some(value) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Lookup::Hit(value)
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                Lookup::Miss
            }
        }
    }

    /// Cached value without touching the counters.
    pub fn get(&self, method: &str, key: Option<&ArgKey>) -> Option<V> {
        self.map()?.get(method)?.get(key).cloned()
    }

    pub fn contains(&self, method: &str, key: Option<&ArgKey>) -> bool {
        self.map()
            .and_then(|slots| slots.get(method))
            .map(|slot| slot.contains(key))
            .unwrap_or(false)
    }

    /// Return the cached value, or run `compute` and cache its result.
    ///
    /// `compute` runs with no lock held. If another computation stored a
    /// value for the same key meanwhile, the stored value wins.
    pub fn fetch_or_compute<F>(&self, method: &str, key: Option<ArgKey>, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Lookup::Hit(value) = self.lookup(method, key.as_ref()) {
            return value;
        }
        let value = compute();
        self.insert_if_absent(method, key, value)
    }

    /// Fallible variant of [`fetch_or_compute`](Self::fetch_or_compute).
    /// Errors are returned to the caller and never cached.
    pub fn try_fetch_or_compute<F, E>(
        &self,
        method: &str,
        key: Option<ArgKey>,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Lookup::Hit(value) = self.lookup(method, key.as_ref()) {
            return Ok(value);
        }
        let value = compute()?;
        Ok(self.insert_if_absent(method, key, value))
    }

    /// Cache a freshly computed value unless an entry appeared meanwhile.
    /// Returns the value that ends up cached.
    pub fn insert_if_absent(&self, method: &str, key: Option<ArgKey>, value: V) -> V {
        let mut slot = self
            .map_or_init()
            .entry(method.to_string())
            .or_insert_with(|| CacheSlot::for_key(key.as_ref()));
        slot.insert_if_absent(key, value).clone()
    }

    /// Store a value as if it had been computed, replacing any entry.
    pub fn preset(&self, method: &str, key: Option<ArgKey>, value: V) {
        let mut slot = self
            .map_or_init()
            .entry(method.to_string())
            .or_insert_with(|| CacheSlot::for_key(key.as_ref()));
        slot.insert(key, value);
        self.stats.presets.fetch_add(1, Ordering::Relaxed);
    }

    /// Drop a single entry. Returns true if it was cached.
    pub fn reset_entry(&self, method: &str, key: Option<&ArgKey>) -> bool {
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        match self.map().and_then(|slots| slots.get_mut(method)) {
            Some(mut slot) => slot.remove(key),
            None => false,
        }
    }

    /// Drop every entry of one method. Returns the number removed.
    pub fn reset_method(&self, method: &str) -> usize {
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        self.map()
            .and_then(|slots| slots.remove(method))
            .map(|(_, slot)| slot.len())
            .unwrap_or(0)
    }

    /// Drop everything. Returns the number of entries removed.
    pub fn reset_all(&self) -> usize {
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        let removed = self.len();
        if let Some(slots) = self.map() {
            slots.clear();
        }
        removed
    }

    /// Number of cached entries across all methods.
    pub fn len(&self) -> usize {
        self.map()
            .map(|slots| slots.iter().map(|slot| slot.len()).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries cached for one method.
    pub fn method_len(&self, method: &str) -> usize {
        self.map()
            .and_then(|slots| slots.get(method))
            .map(|slot| slot.len())
            .unwrap_or(0)
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            presets: self.stats.presets.load(Ordering::Relaxed),
            resets: self.stats.resets.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<V: Clone> Default for MemoStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
