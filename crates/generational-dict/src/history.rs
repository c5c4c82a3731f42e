//! Per-key history: an ordered mapping from generation to value.
//!
//! Entries are kept sorted by generation. The store only ever writes at its
//! current generation, which is never below a key's latest entry, so writes
//! are appends or an overwrite of the last slot. The last entry is the
//! latest value, giving O(1) `latest()` without a scan.

use std::mem;

use smallvec::SmallVec;

use crate::Generation;

/// Every value ever written under one key, indexed by generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History<V> {
    /// Sorted by generation, at most one entry per generation.
    entries: SmallVec<[(Generation, V); 1]>,
}

impl<V> Default for History<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> History<V> {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Number of generations with a value.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no value was ever recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `value` at `generation`.
    ///
    /// Returns the value previously stored at exactly that generation.
    /// Earlier generations are left untouched.
    pub fn insert(&mut self, generation: Generation, value: V) -> Option<V> {
        if let Some((last, slot)) = self.entries.last_mut() {
            if *last == generation {
                return Some(mem::replace(slot, value));
            }
        }

        if self.latest_generation().is_none_or(|last| last < generation) {
            self.entries.push((generation, value));
            return None;
        }

        match self.entries.binary_search_by_key(&generation, |(g, _)| *g) {
            Ok(index) => Some(mem::replace(&mut self.entries[index].1, value)),
            Err(index) => {
                self.entries.insert(index, (generation, value));
                None
            }
        }
    }

    /// Value written at exactly `generation`.
    pub fn get(&self, generation: Generation) -> Option<&V> {
        self.entries
            .binary_search_by_key(&generation, |(g, _)| *g)
            .ok()
            .map(|index| &self.entries[index].1)
    }

    /// Entry visible as of `generation`: the one at the highest generation
    /// `<= generation`.
    pub fn entry_as_of(&self, generation: Generation) -> Option<(Generation, &V)> {
        let visible = self.entries.partition_point(|(g, _)| *g <= generation);
        let (found, value) = self.entries.get(visible.checked_sub(1)?)?;
        Some((*found, value))
    }

    /// Value visible as of `generation`.
    #[inline]
    pub fn as_of(&self, generation: Generation) -> Option<&V> {
        self.entry_as_of(generation).map(|(_, value)| value)
    }

    /// Value at the highest generation ever written.
    #[inline]
    pub fn latest(&self) -> Option<&V> {
        self.entries.last().map(|(_, value)| value)
    }

    /// Highest generation ever written.
    #[inline]
    pub fn latest_generation(&self) -> Option<Generation> {
        self.entries.last().map(|(generation, _)| *generation)
    }

    /// Iterate `(generation, value)` pairs in ascending generation order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Generation, &V)> + ExactSizeIterator {
        self.entries.iter().map(|(generation, value)| (*generation, value))
    }

    /// Generations holding a value, ascending.
    pub fn generations(&self) -> impl DoubleEndedIterator<Item = Generation> + ExactSizeIterator {
        self.entries.iter().map(|(generation, _)| *generation)
    }
}
