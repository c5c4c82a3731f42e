//! The generational dictionary: one [`History`] per key plus a shared
//! [`GenerationCounter`].
//!
//! # Lifecycle
//!
//! ```text
//! advance_generation()      add(k, v)*         advance_generation() ...
//!   gen N -> N+1     ──►   writes at N+1  ──►   commit N+1, open N+2
//!        │
//!        └── abandon_generation()   only while nothing was written at N+1
//! ```
//!
//! Abandoning is guarded: if any entry sits at the generation being left the
//! call fails with [`DictError::InvalidState`](crate::DictError::InvalidState)
//! and nothing changes. Without the guard such an entry would be orphaned
//! above the counter: invisible to as-of reads at the current generation, and
//! overwritten by the next write at that generation number.

use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
};

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace, warn};

use crate::{
    DictResult, Generation, GenerationCounter, History,
    select::{self, Predicate, View},
};

/// Owned result of a bulk read, keyed like the store.
pub type Snapshot<K, V> = HashMap<K, V, FxBuildHasher>;

/// A key/value store that keeps every value ever written under a key,
/// tagged by the generation it was written at.
///
/// Single-writer and synchronous. Share it across threads by wrapping the
/// whole structure in a lock; reads of a history must not interleave with
/// writes to it.
#[derive(Clone, Debug)]
pub struct GenerationalDict<K, V, S = FxBuildHasher> {
    histories: HashMap<K, History<V>, S>,
    counter: GenerationCounter,
}

impl<K, V> GenerationalDict<K, V> {
    /// Create an empty store at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }

    /// Create an empty store with room for `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FxBuildHasher)
    }
}

impl<K, V> Default for GenerationalDict<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> GenerationalDict<K, V, S> {
    /// Create an empty store using `hasher` for keys.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            histories: HashMap::with_hasher(hasher),
            counter: GenerationCounter::new(),
        }
    }

    /// Create an empty store with room for `capacity` keys, using `hasher`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            histories: HashMap::with_capacity_and_hasher(capacity, hasher),
            counter: GenerationCounter::new(),
        }
    }

    // ==================== Generation Control ====================

    /// Generation that writes currently land at.
    #[inline]
    pub const fn generation(&self) -> Generation {
        self.counter.current()
    }

    /// Writes performed since the last advance or abandon.
    #[inline]
    pub const fn updates_at_this_generation(&self) -> u64 {
        self.counter.updates()
    }

    /// Whether the current generation has received writes.
    #[inline]
    pub const fn is_dirty(&self) -> bool {
        self.counter.is_dirty()
    }

    /// Highest generation any key was written at.
    #[inline]
    pub const fn highest_written_generation(&self) -> Option<Generation> {
        self.counter.highest_written()
    }

    /// Commit the current generation and open the next one.
    ///
    /// Returns the new generation. Always succeeds.
    pub fn advance_generation(&mut self) -> Generation {
        let committed_updates = self.counter.updates();
        let generation = self.counter.advance();
        debug!(generation, committed_updates, "advanced generation");
        generation
    }

    /// Undo a speculative [`advance_generation`](Self::advance_generation).
    ///
    /// Only valid while no key holds an entry at the current generation.
    /// Unlike a bare decrement this never rolls the counter below a written
    /// generation: such calls fail with [`DictError::InvalidState`] and leave
    /// the store unchanged.
    ///
    /// [`DictError::InvalidState`]: crate::DictError::InvalidState
    pub fn abandon_generation(&mut self) -> DictResult<Generation> {
        self.counter
            .abandon()
            .inspect(|generation| debug!(generation, "abandoned generation"))
            .inspect_err(|err| warn!(%err, "rejected generation abandon"))
    }

    // ==================== Bulk Reads ====================

    /// Number of keys ever written.
    #[inline]
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    /// Whether no key was ever written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Every key ever written, in unspecified order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> {
        self.histories.keys()
    }

    /// Every key with its full history, in unspecified order.
    pub fn histories(&self) -> impl ExactSizeIterator<Item = (&K, &History<V>)> {
        self.histories.iter()
    }

    /// Select one value per key according to `view`, keeping those accepted
    /// by `predicate`.
    ///
    /// Keys with nothing to show under `view` are skipped. Iteration order
    /// is the store's, stable until the next write.
    pub fn select<'p>(
        &self,
        view: View,
        predicate: Option<Predicate<'p, V>>,
    ) -> impl Iterator<Item = (&K, &V)> {
        select::select(self.histories.iter(), view, predicate)
    }

    /// Every key that has a value at or before `generation`, with that value.
    pub fn iter_as_of(&self, generation: Generation) -> impl Iterator<Item = (&K, &V)> {
        self.select(View::AsOf(generation), None)
    }

    /// Every key with its latest value.
    pub fn iter_latest(&self) -> impl Iterator<Item = (&K, &V)> {
        self.select(View::Latest, None)
    }

    /// Values of [`select`](Self::select), in store order.
    pub fn select_values(&self, view: View, predicate: Option<Predicate<'_, V>>) -> Vec<V>
    where
        V: Clone,
    {
        self.select(view, predicate)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// As-of values for all keys, filtered by `predicate`.
    pub fn snapshot_as_of_values(
        &self,
        generation: Generation,
        predicate: Option<Predicate<'_, V>>,
    ) -> Vec<V>
    where
        V: Clone,
    {
        self.select_values(View::AsOf(generation), predicate)
    }

    /// Latest values for all keys, filtered by `predicate`.
    pub fn snapshot_latest_values(&self, predicate: Option<Predicate<'_, V>>) -> Vec<V>
    where
        V: Clone,
    {
        self.select_values(View::Latest, predicate)
    }
}

impl<K, V, S> GenerationalDict<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    // ==================== Writes ====================

    /// Record `value` under `key` at the current generation.
    ///
    /// Creates the key's history on first write. A second write to the same
    /// key within one generation replaces the first and returns it; no new
    /// history entry is created.
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        let generation = self.counter.record_write();
        let replaced = self.histories.entry(key).or_default().insert(generation, value);
        trace!(
            generation,
            updates = self.counter.updates(),
            overwrote = replaced.is_some(),
            "recorded write"
        );
        replaced
    }

    /// Advance the generation, then record `value` under `key` in it.
    ///
    /// Returns the generation the value was written at.
    pub fn add_and_advance(&mut self, key: K, value: V) -> Generation {
        let generation = self.advance_generation();
        self.add(key, value);
        generation
    }

    // ==================== Point Reads ====================

    /// Whether `key` was ever written, at any generation.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.histories.contains_key(key)
    }

    /// Full history of `key`.
    pub fn history<Q>(&self, key: &Q) -> Option<&History<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.histories.get(key)
    }

    /// Value of `key` as it stood at `generation`: the one written at the
    /// highest generation `<= generation`.
    ///
    /// `None` if the key was never written, or only after `generation`.
    pub fn get_as_of<Q>(&self, key: &Q, generation: Generation) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.history(key)?.as_of(generation)
    }

    /// Value of `key` at the highest generation it was ever written at,
    /// independent of the current generation counter.
    pub fn get_latest<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.history(key)?.latest()
    }

    /// Highest generation `key` was written at.
    pub fn latest_generation<Q>(&self, key: &Q) -> Option<Generation>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.history(key)?.latest_generation()
    }

    // ==================== Snapshots ====================

    /// Owned copy of [`select`](Self::select).
    pub fn select_map(&self, view: View, predicate: Option<Predicate<'_, V>>) -> Snapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.select(view, predicate)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Every key with its value as of `generation`, filtered by `predicate`.
    ///
    /// Keys with no value at or before `generation` are left out.
    pub fn snapshot_as_of(
        &self,
        generation: Generation,
        predicate: Option<Predicate<'_, V>>,
    ) -> Snapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.select_map(View::AsOf(generation), predicate)
    }

    /// Every key with its latest value, filtered by `predicate`.
    pub fn snapshot_latest(&self, predicate: Option<Predicate<'_, V>>) -> Snapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.select_map(View::Latest, predicate)
    }
}
