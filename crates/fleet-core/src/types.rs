//! Domain types for the fleetpool instance model.
//!
//! An instance is identified by an opaque [`InstanceId`], carries
//! provider-defined key/value tags (its display name lives under the
//! `"Name"` tag), and is in exactly one [`RunState`] at a time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tag key under which providers carry an instance's display name.
pub const NAME_TAG: &str = "Name";

/// Opaque provider-assigned instance identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Provider-defined run states.
///
/// A pool only tracks `Running` and `Stopped`; instances in any other
/// state are invisible to it (neither counted nor actioned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
}

impl RunState {
    /// String form as providers report it.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Pending => "pending",
            RunState::Running => "running",
            RunState::Stopping => "stopping",
            RunState::Stopped => "stopped",
            RunState::ShuttingDown => "shutting-down",
            RunState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized run-state name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown run state: {0}")]
pub struct UnknownRunState(pub String);

impl FromStr for RunState {
    type Err = UnknownRunState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RunState::Pending),
            "running" => Ok(RunState::Running),
            "stopping" => Ok(RunState::Stopping),
            "stopped" => Ok(RunState::Stopped),
            "shutting-down" => Ok(RunState::ShuttingDown),
            "terminated" => Ok(RunState::Terminated),
            other => Err(UnknownRunState(other.to_string())),
        }
    }
}

/// One compute instance as the provider reports it.
///
/// Records are point-in-time: a pool replaces them wholesale on every
/// refresh and never patches them incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: InstanceId,
    /// Provider key/value tags. The display name lives under [`NAME_TAG`].
    pub tags: HashMap<String, String>,
    pub state: RunState,
}

impl InstanceRecord {
    /// Create a record with no tags.
    pub fn new(id: impl Into<InstanceId>, state: RunState) -> Self {
        Self {
            id: id.into(),
            tags: HashMap::new(),
            state,
        }
    }

    /// Attach a display name (the `"Name"` tag).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.tags.insert(NAME_TAG.to_string(), name.into());
        self
    }

    /// The display name, if the instance carries a name tag.
    pub fn name(&self) -> Option<&str> {
        self.tags.get(NAME_TAG).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_state_round_trips_through_strings() {
        for state in [
            RunState::Pending,
            RunState::Running,
            RunState::Stopping,
            RunState::Stopped,
            RunState::ShuttingDown,
            RunState::Terminated,
        ] {
            assert_eq!(state.as_str().parse::<RunState>(), Ok(state));
        }
    }

    #[test]
    fn unknown_run_state_is_rejected() {
        let err = "hibernating".parse::<RunState>().unwrap_err();
        assert_eq!(err, UnknownRunState("hibernating".to_string()));
    }

    #[test]
    fn record_name_reads_the_name_tag() {
        let record = InstanceRecord::new("i-1", RunState::Running).with_name("web-1");
        assert_eq!(record.name(), Some("web-1"));
    }

    #[test]
    fn record_without_name_tag_has_no_name() {
        let mut record = InstanceRecord::new("i-1", RunState::Running);
        record.tags.insert("Team".to_string(), "infra".to_string());
        assert_eq!(record.name(), None);
    }

    #[test]
    fn instance_id_display_and_conversions() {
        let id = InstanceId::from("i-0abc");
        assert_eq!(id.to_string(), "i-0abc");
        assert_eq!(id.as_str(), "i-0abc");
        assert_eq!(id.clone().into_string(), "i-0abc");
    }
}
