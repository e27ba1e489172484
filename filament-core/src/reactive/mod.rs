//! Reactive Primitives
//!
//! This module implements the dependency-tracking engine: scopes, signals
//! and effects.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a typed handle to a mutable cell owned by a [`Scope`]. When a
//! signal is read while an effect is running, the scope records that the
//! effect depends on it. When the signal is written, every effect that
//! depends on it re-runs before the write returns.
//!
//! ## Effects
//!
//! An Effect is a zero-argument closure registered with a scope. It runs
//! once when created, which is how its dependencies are discovered, and
//! again after every write to any signal it has read.
//!
//! ## Scopes
//!
//! A Scope owns the values, the effect bodies, the subscription edges and
//! the stack of running effects for one independent reactive graph.
//!
//! # Implementation Notes
//!
//! There is no global state. Each scope keeps an explicit execution stack,
//! so nested effects attribute reads to the innermost running effect. How
//! edges evolve across re-runs is decided by a [`SubscriptionPolicy`].

mod context;
mod effect;
mod policy;
mod runtime;
mod signal;
mod store;
mod subscriber;

pub use effect::EffectFn;
pub use policy::{Accumulate, Refresh, SubscriptionPolicy};
pub use runtime::{Scope, ScopeBuilder, WeakScope};
pub use signal::Signal;
pub use store::SignalId;
pub use subscriber::{EffectId, SubscriptionTable};
