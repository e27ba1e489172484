//! Reactive Scope
//!
//! The scope is the central coordinator that connects signals and effects.
//! It owns every signal value, every effect body, the subscription edges
//! between them, and the stack of effects currently executing.
//!
//! # How It Works
//!
//! 1. Creating an effect appends its body to the registry and runs it once
//!    immediately.
//!
//! 2. While an effect runs it sits on top of the execution stack. Every
//!    signal read records an edge from that signal to the top of the stack.
//!    A read with an empty stack records nothing.
//!
//! 3. Writing a signal stores the new value, then re-runs each subscriber in
//!    the order it first subscribed. Every re-run re-establishes tracking,
//!    so new reads keep adding edges.
//!
//! Everything is synchronous. A write returns only after every effect it
//! triggered (and everything those effects triggered in turn) has finished.
//! There is no batching and no equality check: two writes mean two
//! cascades, even if the value did not change.
//!
//! # Ownership
//!
//! [`Scope`] is a cheap handle around shared state. Signal handles hold only
//! a weak reference, so effect closures that capture signals do not keep the
//! scope alive. Dropping the last `Scope` handle frees all values and effect
//! bodies.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::context::{EffectFrame, ExecutionStack};
use super::effect::EffectRegistry;
use super::policy::{Accumulate, SubscriptionPolicy};
use super::store::ValueStore;
use super::subscriber::SubscriptionTable;
use super::{EffectId, Signal, SignalId};
use crate::config::ScopeConfig;
use crate::diagnostics::{DiagnosticSink, NoopSink, TraceEvent, TraceLevel, TracingSink};
use crate::error::ScopeError;

struct ScopeInner {
    values: RefCell<ValueStore>,
    effects: RefCell<EffectRegistry>,
    subscriptions: RefCell<SubscriptionTable>,
    stack: RefCell<ExecutionStack>,
    policy: Box<dyn SubscriptionPolicy>,
    sink: Box<dyn DiagnosticSink>,
}

/// A reactive universe: signals, effects and the edges between them.
///
/// Scopes are independent of each other. A signal created in one scope can
/// only be read or written through that scope.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use filament_core::reactive::Scope;
///
/// let cx = Scope::new();
/// let count = cx.create_signal(0);
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let sink = log.clone();
/// let reader = count.clone();
/// cx.create_effect(move || sink.borrow_mut().push(reader.get()));
///
/// count.set(5);
/// assert_eq!(*log.borrow(), vec![0, 5]);
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

/// A non-owning reference to a [`Scope`].
///
/// Effects that need the scope itself (for example to create nested effects)
/// should capture one of these rather than a `Scope`, otherwise the scope
/// owns a closure that owns the scope and is never freed.
#[derive(Clone)]
pub struct WeakScope {
    inner: Weak<ScopeInner>,
}

impl WeakScope {
    pub fn upgrade(&self) -> Option<Scope> {
        self.inner.upgrade().map(|inner| Scope { inner })
    }
}

impl fmt::Debug for WeakScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakScope")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Builder for a [`Scope`] with a non-default policy or sink.
pub struct ScopeBuilder {
    policy: Box<dyn SubscriptionPolicy>,
    sink: Box<dyn DiagnosticSink>,
}

impl ScopeBuilder {
    pub fn new() -> Self {
        Self {
            policy: Box::new(Accumulate),
            sink: Box::new(NoopSink),
        }
    }

    /// Use `policy` to maintain subscription edges across runs.
    pub fn policy(mut self, policy: impl SubscriptionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn boxed_policy(mut self, policy: Box<dyn SubscriptionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Deliver engine trace events to `sink`.
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn build(self) -> Scope {
        Scope {
            inner: Rc::new(ScopeInner {
                values: RefCell::new(ValueStore::new()),
                effects: RefCell::new(EffectRegistry::new()),
                subscriptions: RefCell::new(SubscriptionTable::new()),
                stack: RefCell::new(ExecutionStack::new()),
                policy: self.policy,
                sink: self.sink,
            }),
        }
    }
}

impl Default for ScopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// Create an empty scope with the accumulating policy and no diagnostics.
    pub fn new() -> Self {
        ScopeBuilder::new().build()
    }

    pub fn builder() -> ScopeBuilder {
        ScopeBuilder::new()
    }

    /// Create a scope as described by `config`.
    pub fn from_config(config: &ScopeConfig) -> Self {
        let builder = ScopeBuilder::new().boxed_policy(config.policy.build());
        match config.trace {
            TraceLevel::Off => builder.build(),
            level => builder.sink(TracingSink::new(level)).build(),
        }
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Allocate a new signal holding `value`.
    pub fn create_signal<T: 'static>(&self, value: T) -> Signal<T> {
        let id = self.inner.values.borrow_mut().allocate(value);
        self.emit(TraceEvent::SignalCreated { signal: id });
        Signal::bind(self.downgrade(), id)
    }

    /// Register an effect and run it once immediately.
    ///
    /// Every signal the body reads, on this run or any later one, will
    /// re-run it when written. A panic inside the body propagates out of
    /// this call; the effect stays registered.
    pub fn create_effect<F>(&self, body: F) -> EffectId
    where
        F: Fn() + 'static,
    {
        let effect = self.inner.effects.borrow_mut().register(Rc::new(body));
        self.emit(TraceEvent::EffectCreated { effect });
        self.run_effect(effect);
        effect
    }

    /// Run an effect now, tracking the signals it reads.
    ///
    /// # Panics
    ///
    /// Panics if `effect` was not issued by this scope.
    pub fn run_effect(&self, effect: EffectId) {
        if let Err(err) = self.try_run_effect(effect) {
            panic!("{err}");
        }
    }

    /// Run an effect now, tracking the signals it reads.
    ///
    /// Running while no effect has been registered is a no-op.
    pub fn try_run_effect(&self, effect: EffectId) -> Result<(), ScopeError> {
        let inner = &*self.inner;

        let body = {
            let effects = inner.effects.borrow();
            if effects.is_empty() {
                self.emit(TraceEvent::EmptyRegistry);
                return Ok(());
            }
            effects.checkout(effect)?
        };

        let removed = inner
            .policy
            .prepare_run(&mut inner.subscriptions.borrow_mut(), effect);
        if removed > 0 {
            self.emit(TraceEvent::SubscriptionsCleared { effect, removed });
        }

        let frame = EffectFrame::enter(&inner.stack, effect);
        self.emit(TraceEvent::EffectEntered {
            effect,
            parent: frame.parent(),
        });

        body();

        drop(frame);
        self.emit(TraceEvent::EffectExited { effect });
        Ok(())
    }

    /// Record that the running effect, if any, depends on `signal`.
    pub(crate) fn track(&self, signal: SignalId) {
        let current = self.inner.stack.borrow().current();
        let Some(effect) = current else {
            self.emit(TraceEvent::UntrackedRead { signal });
            return;
        };

        let added = self.inner.subscriptions.borrow_mut().record(signal, effect);
        if added {
            self.emit(TraceEvent::Subscribed { signal, effect });
        } else {
            self.emit(TraceEvent::AlreadySubscribed { signal, effect });
        }
    }

    /// Re-run every subscriber of `signal` in subscription order.
    pub(crate) fn notify(&self, signal: SignalId) {
        let inner = &*self.inner;

        if inner.effects.borrow().is_empty() {
            self.emit(TraceEvent::NoSubscribers { signal });
            return;
        }

        let mut notified = 0;
        if inner.policy.walks_live() {
            // Index into the list as it is right now; effects that subscribe
            // during the walk are picked up by it.
            loop {
                let next = inner.subscriptions.borrow().subscriber_at(signal, notified);
                let Some(effect) = next else { break };
                self.rerun(signal, effect);
                notified += 1;
            }
        } else {
            let subscribers = inner.subscriptions.borrow().subscribers_of(signal);
            for effect in subscribers {
                self.rerun(signal, effect);
                notified += 1;
            }
        }

        if notified == 0 {
            self.emit(TraceEvent::NoSubscribers { signal });
        }
    }

    fn rerun(&self, signal: SignalId, effect: EffectId) {
        self.emit(TraceEvent::Notifying { signal, effect });
        self.run_effect(effect);
    }

    /// Borrow a slot as `T` for the duration of `f`.
    pub(crate) fn with_value<T, R>(
        &self,
        signal: SignalId,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R, ScopeError>
    where
        T: 'static,
    {
        let values = self.inner.values.borrow();
        values.read::<T>(signal).map(f)
    }

    /// Overwrite a slot. Does not notify subscribers.
    pub(crate) fn write_value<T: 'static>(&self, signal: SignalId, value: T) -> Result<(), ScopeError> {
        let previous = self.inner.values.borrow_mut().write(signal, value)?;
        // Dropped with the store unborrowed.
        drop(previous);
        self.emit(TraceEvent::SignalWritten { signal });
        Ok(())
    }

    fn emit(&self, event: TraceEvent) {
        self.inner.sink.event(&event);
    }

    /// Number of signals created in this scope.
    pub fn signal_count(&self) -> usize {
        self.inner.values.borrow().len()
    }

    /// Number of effects registered in this scope.
    pub fn effect_count(&self) -> usize {
        self.inner.effects.borrow().len()
    }

    /// The innermost effect currently executing, if any.
    pub fn running_effect(&self) -> Option<EffectId> {
        self.inner.stack.borrow().current()
    }

    /// How many effects are currently executing (nested).
    pub fn depth(&self) -> usize {
        self.inner.stack.borrow().depth()
    }

    /// The effects that re-run when `signal` is written, in run order.
    pub fn subscribers_of(&self, signal: SignalId) -> Vec<EffectId> {
        self.inner.subscriptions.borrow().subscribers_of(signal)
    }

    pub fn subscriber_count(&self, signal: SignalId) -> usize {
        self.inner.subscriptions.borrow().subscriber_count(signal)
    }

    /// Total number of subscription edges.
    pub fn edge_count(&self) -> usize {
        self.inner.subscriptions.borrow().edge_count()
    }

    /// How many times `effect` has started running, including its first run.
    pub fn run_count(&self, effect: EffectId) -> Result<usize, ScopeError> {
        self.inner.effects.borrow().run_count(effect)
    }

    pub fn policy_name(&self) -> &'static str {
        self.inner.policy.name()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("signals", &self.signal_count())
            .field("effects", &self.effect_count())
            .field("edges", &self.edge_count())
            .field("running_effect", &self.running_effect())
            .field("policy", &self.inner.policy)
            .finish()
    }
}
