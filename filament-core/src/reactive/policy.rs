//! Subscription Policies
//!
//! A policy decides what happens to an effect's existing subscription edges
//! when it re-runs, and how a write walks the subscriber list.
//!
//! - [`Accumulate`] (the default) never removes an edge. An effect that read
//!   a signal once stays subscribed to it forever, even if a later run skips
//!   the read behind a conditional. Writes walk the live subscriber list, so
//!   effects that subscribe during the walk are reached by the same write.
//!
//! - [`Refresh`] clears all of an effect's edges right before it runs and
//!   lets the run re-discover them, so the dependency set always reflects the
//!   most recent execution. Writes walk a copy of the list taken before the
//!   walk starts: a live walk would meet every re-run effect again at the end
//!   of the list.

use std::fmt;

use super::subscriber::SubscriptionTable;
use super::EffectId;

/// Strategy for maintaining subscription edges across effect runs.
pub trait SubscriptionPolicy {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Called right before `effect`'s body runs. Returns the number of edges
    /// that were removed.
    fn prepare_run(&self, table: &mut SubscriptionTable, effect: EffectId) -> usize;

    /// Whether a write walks the live subscriber list (`true`) or a copy
    /// taken before the walk (`false`).
    fn walks_live(&self) -> bool;
}

/// Edges only ever grow.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accumulate;

impl SubscriptionPolicy for Accumulate {
    fn name(&self) -> &'static str {
        "accumulate"
    }

    fn prepare_run(&self, _table: &mut SubscriptionTable, _effect: EffectId) -> usize {
        0
    }

    fn walks_live(&self) -> bool {
        true
    }
}

/// Edges are rebuilt on every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Refresh;

impl SubscriptionPolicy for Refresh {
    fn name(&self) -> &'static str {
        "refresh"
    }

    fn prepare_run(&self, table: &mut SubscriptionTable, effect: EffectId) -> usize {
        table.clear_effect(effect)
    }

    fn walks_live(&self) -> bool {
        false
    }
}

impl fmt::Debug for dyn SubscriptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::SignalId;

    fn table_with_edges() -> SubscriptionTable {
        let mut table = SubscriptionTable::new();
        table.record(SignalId::from(0), EffectId::from(0));
        table.record(SignalId::from(1), EffectId::from(0));
        table.record(SignalId::from(1), EffectId::from(1));
        table
    }

    #[test]
    fn accumulate_keeps_edges() {
        let mut table = table_with_edges();

        assert_eq!(Accumulate.prepare_run(&mut table, EffectId::from(0)), 0);
        assert_eq!(table.edge_count(), 3);
        assert!(Accumulate.walks_live());
    }

    #[test]
    fn refresh_clears_the_running_effect() {
        let mut table = table_with_edges();

        assert_eq!(Refresh.prepare_run(&mut table, EffectId::from(0)), 2);
        assert_eq!(table.edge_count(), 1);
        assert_eq!(
            table.subscribers_of(SignalId::from(1)),
            vec![EffectId::from(1)]
        );
        assert!(!Refresh.walks_live());
    }
}
