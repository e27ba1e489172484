//! Scope Configuration
//!
//! A serializable description of how a scope should be built. Every field
//! has a default, so `{}` is a valid configuration and yields the same scope
//! as [`Scope::new`](crate::reactive::Scope::new).
//!
//! ```json
//! { "policy": "refresh", "trace": "debug" }
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::TraceLevel;
use crate::error::ConfigError;
use crate::reactive::{Accumulate, Refresh, SubscriptionPolicy};

/// Which built-in subscription policy a scope uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Accumulate,
    Refresh,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn SubscriptionPolicy> {
        match self {
            PolicyKind::Accumulate => Box::new(Accumulate),
            PolicyKind::Refresh => Box::new(Refresh),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accumulate" => Ok(PolicyKind::Accumulate),
            "refresh" => Ok(PolicyKind::Refresh),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// How subscription edges are maintained across effect runs.
    pub policy: PolicyKind,

    /// Forward engine events to `tracing` at this level.
    pub trace: TraceLevel,
}

impl ScopeConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = ScopeConfig::from_json("{}").unwrap();
        assert_eq!(config, ScopeConfig::default());
        assert_eq!(config.policy, PolicyKind::Accumulate);
        assert_eq!(config.trace, TraceLevel::Off);
    }

    #[test]
    fn parses_lowercase_names() {
        let config = ScopeConfig::from_json(r#"{"policy": "refresh", "trace": "debug"}"#).unwrap();
        assert_eq!(config.policy, PolicyKind::Refresh);
        assert_eq!(config.trace, TraceLevel::Debug);
    }

    #[test]
    fn survives_json_round_trip() {
        let config = ScopeConfig {
            policy: PolicyKind::Refresh,
            trace: TraceLevel::Trace,
        };
        let json = config.to_json().unwrap();
        assert_eq!(json, r#"{"policy":"refresh","trace":"trace"}"#);
        assert_eq!(ScopeConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(matches!(
            ScopeConfig::from_json(r#"{"policy": "lazy"}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            "lazy".parse::<PolicyKind>(),
            Err(ConfigError::UnknownPolicy(name)) if name == "lazy"
        ));
        assert_eq!(" Refresh ".parse::<PolicyKind>().unwrap(), PolicyKind::Refresh);
    }

    #[test]
    fn policy_kind_builds_matching_policy() {
        assert_eq!(PolicyKind::Accumulate.build().name(), "accumulate");
        assert_eq!(PolicyKind::Refresh.build().name(), "refresh");
    }
}
