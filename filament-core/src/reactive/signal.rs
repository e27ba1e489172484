//! Signal Implementation
//!
//! A Signal is a typed handle to one slot in a scope's value store. The
//! handle itself carries no state beyond the slot id and a weak reference to
//! the scope, so any number of clones can point at the same value.
//!
//! # How Signals Work
//!
//! 1. Reading a signal while an effect is running subscribes that effect to
//!    the signal. Reading outside any effect just returns the value.
//!
//! 2. Writing a signal stores the value and synchronously re-runs every
//!    subscriber, in the order they subscribed. Writes are unconditional:
//!    storing a value equal to the current one still re-runs subscribers.
//!
//! # Typing
//!
//! The store is untyped, but a `Signal<T>` can only be obtained from
//! [`Scope::create_signal::<T>`](super::Scope::create_signal), so the slot
//! always holds a `T`. The store still checks every access and reports a
//! mismatch as [`ScopeError::TypeMismatch`].

use std::fmt;
use std::marker::PhantomData;

use super::runtime::{Scope, WeakScope};
use super::SignalId;
use crate::error::ScopeError;

/// A reactive signal holding a value of type `T`.
///
/// # Example
///
/// ```rust
/// use filament_core::reactive::{Scope, Signal};
///
/// let cx = Scope::new();
/// let count = Signal::new(&cx, 0);
///
/// // Read the value
/// assert_eq!(count.get(), 0);
///
/// // Update the value (re-runs subscribers)
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T> {
    scope: WeakScope,
    id: SignalId,
    marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Signal<T> {
    /// Create a new signal in `scope` with the given initial value.
    pub fn new(scope: &Scope, value: T) -> Self {
        scope.create_signal(value)
    }

    pub(crate) fn bind(scope: WeakScope, id: SignalId) -> Self {
        Self {
            scope,
            id,
            marker: PhantomData,
        }
    }

    /// Get the signal's id within its scope.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Get the current value.
    ///
    /// If called while an effect is running, this also subscribes that
    /// effect to the signal.
    ///
    /// # Panics
    ///
    /// Panics if the scope has been dropped.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.try_get().unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_get(&self) -> Result<T, ScopeError>
    where
        T: Clone,
    {
        self.try_with(T::clone)
    }

    /// Borrow the current value, subscribing the running effect like
    /// [`get`](Self::get).
    ///
    /// The store stays borrowed while `f` runs, so `f` must not write to any
    /// signal of the same scope.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.try_with(f).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, ScopeError> {
        let scope = self.scope()?;
        scope.track(self.id);
        scope.with_value(self.id, f)
    }

    /// Get the current value without subscribing the running effect.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.with_untracked(T::clone)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.try_with_untracked(f)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, ScopeError> {
        self.scope()?.with_value(self.id, f)
    }

    /// Set a new value and re-run every subscriber before returning.
    ///
    /// # Panics
    ///
    /// Panics if the scope has been dropped. Panics raised by subscribers
    /// propagate out of this call.
    pub fn set(&self, value: T) {
        if let Err(err) = self.try_set(value) {
            panic!("{err}");
        }
    }

    pub fn try_set(&self, value: T) -> Result<(), ScopeError> {
        let scope = self.scope()?;
        scope.write_value(self.id, value)?;
        scope.notify(self.id);
        Ok(())
    }

    /// Replace the value with one computed from the current value.
    ///
    /// The read is untracked, so an effect that updates a signal does not
    /// subscribe itself to it.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = self.with_untracked(f);
        self.set(next);
    }

    /// Number of effects that re-run when this signal is written.
    pub fn subscriber_count(&self) -> usize {
        self.scope()
            .map(|scope| scope.subscriber_count(self.id))
            .unwrap_or(0)
    }

    fn scope(&self) -> Result<Scope, ScopeError> {
        self.scope.upgrade().ok_or(ScopeError::ScopeDropped)
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            id: self.id,
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .field("scope", &self.scope)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
