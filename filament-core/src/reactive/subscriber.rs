//! Subscription table for the reactive system.
//!
//! A subscription edge `(signal, effect)` means "re-run `effect` whenever
//! `signal` is written". Each signal keeps its subscribers in insertion order
//! with no duplicates, which is also the order they are re-run in.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use super::SignalId;

/// Identifier of an effect: its position in the owning scope's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(usize);

impl EffectId {
    /// Get the raw registry index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for EffectId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mapping from each signal to the ordered set of effects that depend on it.
///
/// The reverse direction (effect to the signals it is subscribed to) is kept
/// as well so a single effect's edges can be cleared without scanning every
/// signal.
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    subscribers: IndexMap<SignalId, IndexSet<EffectId>>,
    sources: IndexMap<EffectId, SmallVec<[SignalId; 4]>>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `effect` to the subscribers of `signal`.
    ///
    /// Returns `false` if the edge already existed.
    pub fn record(&mut self, signal: SignalId, effect: EffectId) -> bool {
        let added = self.subscribers.entry(signal).or_default().insert(effect);
        if added {
            self.sources.entry(effect).or_default().push(signal);
        }
        added
    }

    /// The subscriber at position `index` of `signal`'s list, if any.
    ///
    /// Used to walk a list that may grow while it is being walked.
    pub fn subscriber_at(&self, signal: SignalId, index: usize) -> Option<EffectId> {
        self.subscribers
            .get(&signal)
            .and_then(|effects| effects.get_index(index))
            .copied()
    }

    /// All subscribers of `signal` in subscription order.
    ///
    /// A signal nobody ever read and a signal whose list was emptied look the
    /// same: an empty vector.
    pub fn subscribers_of(&self, signal: SignalId) -> Vec<EffectId> {
        self.subscribers
            .get(&signal)
            .map(|effects| effects.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self, signal: SignalId) -> usize {
        self.subscribers.get(&signal).map_or(0, IndexSet::len)
    }

    /// Remove every edge that points at `effect`, keeping the relative order
    /// of the remaining subscribers. Returns the number of edges removed.
    pub fn clear_effect(&mut self, effect: EffectId) -> usize {
        let Some(signals) = self.sources.swap_remove(&effect) else {
            return 0;
        };
        for signal in &signals {
            if let Some(effects) = self.subscribers.get_mut(signal) {
                effects.shift_remove(&effect);
            }
        }
        signals.len()
    }

    /// Total number of edges in the table.
    pub fn edge_count(&self) -> usize {
        self.subscribers.values().map(IndexSet::len).sum()
    }
}
