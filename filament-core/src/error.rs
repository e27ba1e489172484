//! Error Types
//!
//! The engine is meant for trusted, single-owner use, so the taxonomy is
//! small. Every [`ScopeError`] is a contract violation: the panicking API
//! (`Signal::get`, `Signal::set`, `Scope::run_effect`) turns it into a panic,
//! while the `try_*` twins hand it back to the caller.
//!
//! Faults inside effect bodies are not represented here. They are ordinary
//! panics that unwind to whoever triggered the effect.

use thiserror::Error;

use crate::reactive::{EffectId, SignalId};

/// A misuse of a scope or one of its handles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The scope a handle was created from has been dropped.
    #[error("reactive scope has been dropped")]
    ScopeDropped,

    /// A signal id beyond the end of the value store.
    #[error("signal {signal} is out of range (store holds {len} values)")]
    SignalOutOfRange { signal: SignalId, len: usize },

    /// An effect id beyond the end of the effect registry.
    #[error("effect {effect} is out of range (registry holds {len} effects)")]
    EffectOutOfRange { effect: EffectId, len: usize },

    /// A slot was read back as a different type than it was created with.
    #[error("signal {signal} holds `{found}`, not `{expected}`")]
    TypeMismatch {
        signal: SignalId,
        expected: &'static str,
        found: &'static str,
    },
}

/// Failure to build a [`ScopeConfig`](crate::config::ScopeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid scope configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown subscription policy `{0}` (expected `accumulate` or `refresh`)")]
    UnknownPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_ids() {
        let err = ScopeError::SignalOutOfRange {
            signal: SignalId::from(7),
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "signal 7 is out of range (store holds 3 values)"
        );

        let err = ScopeError::TypeMismatch {
            signal: SignalId::from(0),
            expected: "u32",
            found: "alloc::string::String",
        };
        assert_eq!(
            err.to_string(),
            "signal 0 holds `alloc::string::String`, not `u32`"
        );
    }

    #[test]
    fn unknown_policy_message() {
        let err = ConfigError::UnknownPolicy("lazy".into());
        assert!(err.to_string().contains("`lazy`"));
    }
}
