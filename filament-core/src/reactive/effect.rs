//! Effect Registry
//!
//! An append-only list of effect bodies. An effect's id is its position in
//! the list. Registration alone does not run anything; the scope runs a new
//! effect immediately after registering it, which is how its first set of
//! dependencies is discovered.
//!
//! Bodies are stored as `Rc<dyn Fn()>` so the scope can clone a body out of
//! the registry and call it with no borrow held. That is what lets a body
//! register further effects, write signals, or even trigger itself.

use std::cell::Cell;
use std::rc::Rc;

use super::EffectId;
use crate::error::ScopeError;

/// A zero-argument effect body.
pub type EffectFn = Rc<dyn Fn()>;

struct EffectSlot {
    body: EffectFn,
    runs: Cell<usize>,
}

#[derive(Default)]
pub(crate) struct EffectRegistry {
    slots: Vec<EffectSlot>,
}

impl EffectRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append a body and return its id.
    pub(crate) fn register(&mut self, body: EffectFn) -> EffectId {
        self.slots.push(EffectSlot {
            body,
            runs: Cell::new(0),
        });
        EffectId::from(self.slots.len() - 1)
    }

    /// Fetch a body for execution and count the run.
    pub(crate) fn checkout(&self, effect: EffectId) -> Result<EffectFn, ScopeError> {
        let slot = self.slot(effect)?;
        slot.runs.set(slot.runs.get() + 1);
        Ok(Rc::clone(&slot.body))
    }

    /// Number of times `effect` has been started.
    pub(crate) fn run_count(&self, effect: EffectId) -> Result<usize, ScopeError> {
        self.slot(effect).map(|slot| slot.runs.get())
    }

    fn slot(&self, effect: EffectId) -> Result<&EffectSlot, ScopeError> {
        self.slots.get(effect.index()).ok_or(ScopeError::EffectOutOfRange {
            effect,
            len: self.slots.len(),
        })
    }
}
