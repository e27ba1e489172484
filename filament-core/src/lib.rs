//! Filament Core
//!
//! This crate provides the runtime for Filament, a fine-grained reactivity
//! engine. It implements:
//!
//! - Signals: typed mutable cells that record who reads them
//! - Effects: closures re-run whenever a signal they read is written
//! - Scopes: independent reactive graphs owning both
//!
//! The crate is designed to be used both as a native Rust library and, with
//! the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! - `reactive`: the dependency-tracking engine
//! - `diagnostics`: optional trace events for observing the engine
//! - `config`: serializable scope configuration
//! - `error`: contract-violation errors
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use filament_core::reactive::Scope;
//!
//! let cx = Scope::new();
//!
//! // Create a signal
//! let count = cx.create_signal(0);
//!
//! // Create an effect; it runs immediately and subscribes to `count`
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let (log, reader) = (seen.clone(), count.clone());
//! cx.create_effect(move || log.borrow_mut().push(reader.get()));
//!
//! // Update the signal; the effect re-runs before `set` returns
//! count.set(5);
//! assert_eq!(*seen.borrow(), vec![0, 5]);
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod reactive;

#[cfg(feature = "python")]
mod python;

pub use config::{PolicyKind, ScopeConfig};
pub use diagnostics::{DiagnosticSink, NoopSink, TraceEvent, TraceLevel, TracingSink};
pub use error::{ConfigError, ScopeError};
pub use reactive::{EffectId, Scope, Signal, SignalId};
