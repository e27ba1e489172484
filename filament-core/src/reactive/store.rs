//! Value Store
//!
//! An append-only arena of heterogeneous values, one slot per signal. The
//! slot's position is the signal's id, so ids are dense, zero-based and never
//! reused.
//!
//! Values are stored as `Box<dyn Any>` next to the name of the type they were
//! created with. Typed access goes through a checked downcast, so reading a
//! slot back as the wrong type is reported as [`ScopeError::TypeMismatch`]
//! instead of being silently reinterpreted.

use std::any::{type_name, Any};
use std::fmt;

use crate::error::ScopeError;

/// Identifier of a signal: its slot position in the owning scope's store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalId(usize);

impl SignalId {
    /// Get the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for SignalId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single slot: the value and the type it was created with.
struct Slot {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl Slot {
    fn mismatch<T: 'static>(&self, signal: SignalId) -> ScopeError {
        ScopeError::TypeMismatch {
            signal,
            expected: type_name::<T>(),
            found: self.type_name,
        }
    }
}

/// Index-addressed storage for every signal value in a scope.
#[derive(Default)]
pub(crate) struct ValueStore {
    slots: Vec<Slot>,
}

impl ValueStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of allocated slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Append a new slot and return its id.
    pub(crate) fn allocate<T: 'static>(&mut self, value: T) -> SignalId {
        self.slots.push(Slot {
            value: Box::new(value),
            type_name: type_name::<T>(),
        });
        SignalId(self.slots.len() - 1)
    }

    /// Borrow the value in a slot as `T`.
    pub(crate) fn read<T: 'static>(&self, id: SignalId) -> Result<&T, ScopeError> {
        let slot = self.slot(id)?;
        slot.value
            .downcast_ref::<T>()
            .ok_or_else(|| slot.mismatch::<T>(id))
    }

    /// Overwrite the value in a slot, returning the previous value.
    ///
    /// The old value is handed back rather than dropped in place so the
    /// caller can release its borrow of the store before running any `Drop`
    /// code.
    pub(crate) fn write<T: 'static>(&mut self, id: SignalId, value: T) -> Result<T, ScopeError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(id.0)
            .ok_or(ScopeError::SignalOutOfRange { signal: id, len })?;
        match slot.value.downcast_mut::<T>() {
            Some(current) => Ok(std::mem::replace(current, value)),
            None => Err(slot.mismatch::<T>(id)),
        }
    }

    fn slot(&self, id: SignalId) -> Result<&Slot, ScopeError> {
        self.slots.get(id.0).ok_or(ScopeError::SignalOutOfRange {
            signal: id,
            len: self.slots.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_slot_positions() {
        let mut store = ValueStore::new();
        let a = store.allocate(1_u8);
        let b = store.allocate("two");
        let c = store.allocate(vec![3.0_f64]);

        assert_eq!((a.index(), b.index(), c.index()), (0, 1, 2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn heterogeneous_slots_read_back_typed() {
        let mut store = ValueStore::new();
        let n = store.allocate(10_i32);
        let s = store.allocate(String::from("hello"));

        assert_eq!(*store.read::<i32>(n).unwrap(), 10);
        assert_eq!(store.read::<String>(s).unwrap(), "hello");
    }

    #[test]
    fn write_returns_previous_value() {
        let mut store = ValueStore::new();
        let id = store.allocate(String::from("old"));

        let previous = store.write(id, String::from("new")).unwrap();
        assert_eq!(previous, "old");
        assert_eq!(store.read::<String>(id).unwrap(), "new");
    }

    #[test]
    fn wrong_type_fails_loudly() {
        let mut store = ValueStore::new();
        let id = store.allocate(5_u32);

        assert_eq!(
            store.read::<i64>(id).unwrap_err(),
            ScopeError::TypeMismatch {
                signal: id,
                expected: "i64",
                found: "u32",
            }
        );
        assert!(matches!(
            store.write(id, 1.5_f32),
            Err(ScopeError::TypeMismatch { .. })
        ));
        // A rejected write leaves the slot untouched.
        assert_eq!(*store.read::<u32>(id).unwrap(), 5);
    }

    #[test]
    fn out_of_range_ids_are_rejected() {
        let mut store = ValueStore::new();
        store.allocate(());

        let missing = SignalId::from(4);
        assert_eq!(
            store.read::<()>(missing).unwrap_err(),
            ScopeError::SignalOutOfRange {
                signal: missing,
                len: 1
            }
        );
        assert!(store.write(missing, ()).is_err());
    }
}
