//! Domain primitive types used across the nanoctl workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::NAME_SEPARATOR;
use crate::error::NanoError;

/// User-supplied short name of a cluster (e.g. `mycluster`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterName(String);

impl ClusterName {
    /// Creates a cluster name, rejecting empty names and names containing
    /// the engine's name separator.
    ///
    /// # Errors
    ///
    /// Returns [`NanoError::Config`] if the name is unusable.
    pub fn new(name: impl Into<String>) -> crate::error::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(NanoError::Config {
                message: "cluster name must not be empty".into(),
            });
        }
        if name.contains(NAME_SEPARATOR) {
            return Err(NanoError::Config {
                message: format!("cluster name {name:?} must not contain '{NAME_SEPARATOR}'"),
            });
        }
        Ok(Self(name))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ClusterName {
    type Err = NanoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine-facing container name: the namespace prefix followed by the
/// cluster name. This is the only key used to address the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerName {
    full: String,
    prefix_len: usize,
}

impl ContainerName {
    /// Composes the container name for a cluster.
    #[must_use]
    pub fn new(prefix: &str, cluster: &ClusterName) -> Self {
        Self {
            full: format!("{prefix}{cluster}"),
            prefix_len: prefix.len(),
        }
    }

    /// Returns the full engine-facing name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// Returns the name shown to the user, without the prefix.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.full[self.prefix_len..]
    }

    /// Returns `true` if a name reported by the engine designates this
    /// container. Engine names may carry a leading separator.
    #[must_use]
    pub fn matches(&self, engine_name: &str) -> bool {
        strip_separator(engine_name) == self.full
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full)
    }
}

/// Strips the prefix and the engine's leading separator from a name
/// reported by the engine. Returns `None` for containers outside the
/// namespace.
#[must_use]
pub fn display_name<'a>(engine_name: &'a str, prefix: &str) -> Option<&'a str> {
    strip_separator(engine_name).strip_prefix(prefix)
}

fn strip_separator(name: &str) -> &str {
    name.strip_prefix(NAME_SEPARATOR).unwrap_or(name)
}

/// State of a container as reported by the engine.
///
/// Only `running` and `exited` are reasoned about; any other value is
/// carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerState {
    /// Container is actively running.
    Running,
    /// Container has stopped.
    Exited,
    /// Any other engine state (`created`, `paused`, `restarting`, ...).
    Other(String),
}

impl From<&str> for ContainerState {
    fn from(state: &str) -> Self {
        match state {
            "running" => Self::Running,
            "exited" => Self::Exited,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Exited => write!(f, "exited"),
            Self::Other(state) => write!(f, "{state}"),
        }
    }
}

/// Container attributes the identity resolver can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerField {
    /// Host path of the first bind mount.
    WorkingDirectory,
    /// Value of the first environment entry, which carries the gateway port.
    GatewayPort,
    /// Image reference the container was created from.
    Image,
}

/// Image attributes the identity resolver can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageField {
    /// Repository tags, falling back to repository digests.
    Tag,
    /// Creation timestamp, passed through verbatim.
    Created,
    /// Value of the release label.
    Release,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(name: &str) -> ClusterName {
        ClusterName::new(name).expect("valid cluster name")
    }

    #[test]
    fn container_name_prepends_prefix() {
        let name = ContainerName::new("ceph-nano-", &cluster("foo"));
        assert_eq!(name.as_str(), "ceph-nano-foo");
        assert_eq!(name.to_string(), "ceph-nano-foo");
    }

    #[test]
    fn display_name_inverts_composition() {
        for raw in ["a", "mycluster", "ceph-nano-nested", "x-y_z.1"] {
            let name = ContainerName::new("ceph-nano-", &cluster(raw));
            assert_eq!(name.display_name(), raw);
            assert_eq!(display_name(name.as_str(), "ceph-nano-"), Some(raw));
            let engine_name = format!("/{name}");
            assert_eq!(display_name(&engine_name, "ceph-nano-"), Some(raw));
        }
    }

    #[test]
    fn display_name_rejects_foreign_containers() {
        assert_eq!(display_name("/other-b", "ns-"), None);
        assert_eq!(display_name("/ns-a", "ns-"), Some("a"));
    }

    #[test]
    fn matches_accepts_engine_separator() {
        let name = ContainerName::new("ns-", &cluster("a"));
        assert!(name.matches("/ns-a"));
        assert!(name.matches("ns-a"));
        assert!(!name.matches("/ns-ab"));
    }

    #[test]
    fn cluster_name_rejects_empty_and_separator() {
        assert!(ClusterName::new("").is_err());
        assert!(ClusterName::new("a/b").is_err());
        assert!("ok".parse::<ClusterName>().is_ok());
    }

    #[test]
    fn container_state_parses_known_and_other_states() {
        assert_eq!(ContainerState::from("running"), ContainerState::Running);
        assert_eq!(ContainerState::from("exited"), ContainerState::Exited);
        assert_eq!(
            ContainerState::from("paused"),
            ContainerState::Other("paused".into())
        );
        assert_eq!(ContainerState::from("paused").to_string(), "paused");
    }
}
