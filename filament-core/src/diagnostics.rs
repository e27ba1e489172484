//! Diagnostics
//!
//! The engine narrates what it does as a stream of [`TraceEvent`]s delivered
//! to a [`DiagnosticSink`] injected when the scope is built. Sinks are purely
//! observational: the engine never reads anything back from them, and the
//! default [`NoopSink`] discards every event.
//!
//! [`TracingSink`] forwards events to the `tracing` ecosystem, so installing
//! any `tracing` subscriber is enough to see the dependency graph being
//! built and walked.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::reactive::{EffectId, SignalId};

/// A single step taken by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A slot was allocated in the value store.
    SignalCreated { signal: SignalId },
    /// A signal's slot was overwritten.
    SignalWritten { signal: SignalId },
    /// An effect was appended to the registry.
    EffectCreated { effect: EffectId },
    /// An effect was pushed onto the execution stack.
    EffectEntered {
        effect: EffectId,
        parent: Option<EffectId>,
    },
    /// An effect body returned and its frame was popped.
    EffectExited { effect: EffectId },
    /// A new subscription edge was recorded.
    Subscribed { signal: SignalId, effect: EffectId },
    /// The edge already existed; nothing was recorded.
    AlreadySubscribed { signal: SignalId, effect: EffectId },
    /// A signal was read with no effect running.
    UntrackedRead { signal: SignalId },
    /// A written signal had nobody to notify.
    NoSubscribers { signal: SignalId },
    /// A subscriber is about to re-run because `signal` changed.
    Notifying { signal: SignalId, effect: EffectId },
    /// The subscription policy removed an effect's edges before a run.
    SubscriptionsCleared { effect: EffectId, removed: usize },
    /// A run was requested while no effects were registered.
    EmptyRegistry,
}

impl TraceEvent {
    /// Whether the event fires on every signal read rather than on
    /// effect or signal lifecycle changes.
    pub fn is_per_read(&self) -> bool {
        matches!(
            self,
            TraceEvent::Subscribed { .. }
                | TraceEvent::AlreadySubscribed { .. }
                | TraceEvent::UntrackedRead { .. }
        )
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::SignalCreated { signal } => write!(f, "created signal {signal}"),
            TraceEvent::SignalWritten { signal } => write!(f, "wrote signal {signal}"),
            TraceEvent::EffectCreated { effect } => write!(f, "created effect {effect}"),
            TraceEvent::EffectEntered {
                effect,
                parent: Some(parent),
            } => write!(f, "entered effect {effect} (inside effect {parent})"),
            TraceEvent::EffectEntered { effect, parent: None } => {
                write!(f, "entered effect {effect}")
            }
            TraceEvent::EffectExited { effect } => write!(f, "exited effect {effect}"),
            TraceEvent::Subscribed { signal, effect } => {
                write!(f, "effect {effect} subscribed to signal {signal}")
            }
            TraceEvent::AlreadySubscribed { signal, effect } => {
                write!(f, "effect {effect} already subscribed to signal {signal}")
            }
            TraceEvent::UntrackedRead { signal } => {
                write!(f, "signal {signal} read outside any effect")
            }
            TraceEvent::NoSubscribers { signal } => {
                write!(f, "signal {signal} has no subscribers")
            }
            TraceEvent::Notifying { signal, effect } => {
                write!(f, "re-running effect {effect} because signal {signal} changed")
            }
            TraceEvent::SubscriptionsCleared { effect, removed } => {
                write!(f, "cleared {removed} subscriptions of effect {effect}")
            }
            TraceEvent::EmptyRegistry => f.write_str("no effects registered"),
        }
    }
}

/// Receiver for engine trace events.
pub trait DiagnosticSink {
    fn event(&self, event: &TraceEvent);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Rc<S> {
    fn event(&self, event: &TraceEvent) {
        (**self).event(event);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn event(&self, _event: &TraceEvent) {}
}

/// How much of the event stream [`TracingSink`] forwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    /// Forward nothing.
    #[default]
    Off,
    /// Lifecycle events only, at `DEBUG`.
    Debug,
    /// Lifecycle events at `DEBUG` plus per-read events at `TRACE`.
    Trace,
}

/// Sink that emits events through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: TraceLevel,
}

impl TracingSink {
    pub fn new(level: TraceLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> TraceLevel {
        self.level
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(TraceLevel::Trace)
    }
}

impl DiagnosticSink for TracingSink {
    fn event(&self, event: &TraceEvent) {
        match (self.level, event.is_per_read()) {
            (TraceLevel::Off, _) | (TraceLevel::Debug, true) => {}
            (_, true) => emit_trace(event),
            (_, false) => emit_debug(event),
        }
    }
}

fn emit_trace(event: &TraceEvent) {
    match *event {
        TraceEvent::Subscribed { signal, effect } => {
            tracing::trace!(signal = signal.index(), effect = effect.index(), "subscribed");
        }
        TraceEvent::AlreadySubscribed { signal, effect } => {
            tracing::trace!(
                signal = signal.index(),
                effect = effect.index(),
                "already subscribed"
            );
        }
        TraceEvent::UntrackedRead { signal } => {
            tracing::trace!(signal = signal.index(), "untracked read");
        }
        _ => tracing::trace!("{event}"),
    }
}

fn emit_debug(event: &TraceEvent) {
    match *event {
        TraceEvent::EffectEntered { effect, parent } => {
            tracing::debug!(
                effect = effect.index(),
                parent = ?parent.map(EffectId::index),
                "effect entered"
            );
        }
        TraceEvent::Notifying { signal, effect } => {
            tracing::debug!(
                signal = signal.index(),
                effect = effect.index(),
                "notifying subscriber"
            );
        }
        TraceEvent::SubscriptionsCleared { effect, removed } => {
            tracing::debug!(effect = effect.index(), removed, "subscriptions cleared");
        }
        _ => tracing::debug!("{event}"),
    }
}
