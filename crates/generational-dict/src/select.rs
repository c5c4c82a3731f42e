//! Bulk selection shared by every snapshot query.
//!
//! A bulk read is a [`View`] (which value of each history to look at) plus
//! an optional [`Predicate`]. Keys whose view yields nothing are skipped.

use crate::{Generation, History};

/// Optional filter applied to each selected value.
pub type Predicate<'p, V> = &'p dyn Fn(&V) -> bool;

/// Which value of a history a bulk read picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Value visible at or before this generation.
    AsOf(Generation),
    /// Value at the key's highest generation.
    Latest,
}

impl View {
    /// The value of `history` this view selects.
    #[inline]
    pub fn pick<V>(self, history: &History<V>) -> Option<&V> {
        match self {
            Self::AsOf(generation) => history.as_of(generation),
            Self::Latest => history.latest(),
        }
    }
}

#[inline]
pub(crate) fn accepts<V>(predicate: Option<Predicate<'_, V>>, value: &V) -> bool {
    predicate.is_none_or(|predicate| predicate(value))
}

pub(crate) fn select<'a, K: 'a, V: 'a>(
    histories: impl Iterator<Item = (&'a K, &'a History<V>)>,
    view: View,
    predicate: Option<Predicate<'_, V>>,
) -> impl Iterator<Item = (&'a K, &'a V)> {
    histories.filter_map(move |(key, history)| {
        view.pick(history)
            .filter(|value| accepts(predicate, *value))
            .map(|value| (key, value))
    })
}
