//! Global configuration model for nanoctl.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{NanoError, Result};

/// Root configuration for nanoctl.
///
/// Every field has a default, so a configuration file only needs to list
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NanoConfig {
    /// Prefix prepended to logical cluster names.
    pub container_prefix: String,
    /// Image used when creating a new cluster.
    pub image: String,
    /// Host directory bound into new clusters.
    pub working_dir: PathBuf,
    /// Readiness polling parameters.
    pub readiness: ReadinessConfig,
    /// Gateway port scan parameters.
    pub ports: PortRangeConfig,
    /// Gateway account and in-container paths.
    pub gateway: GatewayConfig,
    /// Registry endpoint listing the published tags.
    pub registry_tags_url: String,
}

impl Default for NanoConfig {
    fn default() -> Self {
        Self {
            container_prefix: constants::CONTAINER_NAME_PREFIX.to_string(),
            image: constants::DEFAULT_IMAGE.to_string(),
            working_dir: PathBuf::from(constants::DEFAULT_WORKING_DIR),
            readiness: ReadinessConfig::default(),
            ports: PortRangeConfig::default(),
            gateway: GatewayConfig::default(),
            registry_tags_url: constants::REGISTRY_TAGS_URL.to_string(),
        }
    }
}

impl NanoConfig {
    /// Loads the configuration from a TOML file, or returns the defaults
    /// when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, cannot be parsed, or
    /// describes an empty port range.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|e| NanoError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`NanoError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.container_prefix.is_empty() {
            return Err(NanoError::Config {
                message: "container_prefix must not be empty".into(),
            });
        }
        if self.ports.min > self.ports.max {
            return Err(NanoError::Config {
                message: format!(
                    "port range {}-{} is empty",
                    self.ports.min, self.ports.max
                ),
            });
        }
        if self.readiness.internal_poll_ceiling == 0 || self.readiness.external_poll_ceiling == 0 {
            return Err(NanoError::Config {
                message: "poll ceilings must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Parameters of the two readiness polling phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Log token signalling internal readiness.
    pub marker: String,
    /// Maximum number of log polls.
    pub internal_poll_ceiling: u32,
    /// Maximum number of gateway probes.
    pub external_poll_ceiling: u32,
    /// Spacing between polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Timeout of a single gateway probe, in milliseconds.
    pub http_timeout_ms: u64,
}

impl ReadinessConfig {
    /// Returns the spacing between polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns the timeout of a single gateway probe.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            marker: constants::READINESS_MARKER.to_string(),
            internal_poll_ceiling: constants::INTERNAL_POLL_CEILING,
            external_poll_ceiling: constants::EXTERNAL_POLL_CEILING,
            poll_interval_ms: constants::POLL_INTERVAL_MS,
            http_timeout_ms: constants::HTTP_PROBE_TIMEOUT_MS,
        }
    }
}

/// Inclusive port range scanned for a free gateway port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortRangeConfig {
    /// First candidate port.
    pub min: u16,
    /// Last candidate port.
    pub max: u16,
    /// Connection timeout per candidate, in milliseconds.
    pub probe_timeout_ms: u64,
}

impl PortRangeConfig {
    /// Returns the candidate ports in scan order.
    #[must_use]
    pub const fn range(&self) -> RangeInclusive<u16> {
        self.min..=self.max
    }

    /// Returns the connection timeout per candidate.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for PortRangeConfig {
    fn default() -> Self {
        Self {
            min: constants::GATEWAY_PORT_MIN,
            max: constants::GATEWAY_PORT_MAX,
            probe_timeout_ms: constants::PORT_PROBE_TIMEOUT_MS,
        }
    }
}

/// Gateway account and in-container locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Account name created by the image.
    pub user: String,
    /// Path of the credentials document inside the container.
    pub credentials_path: String,
    /// Mount point of the working directory inside the container.
    pub data_dir: String,
    /// Command printing the gateway log inside the container.
    pub log_command: Vec<String>,
    /// Command printing the cluster health summary inside the container.
    pub health_command: Vec<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            user: constants::GATEWAY_USER.to_string(),
            credentials_path: constants::CREDENTIALS_PATH.to_string(),
            data_dir: constants::CONTAINER_DATA_DIR.to_string(),
            log_command: constants::GATEWAY_LOG_COMMAND
                .iter()
                .map(ToString::to_string)
                .collect(),
            health_command: constants::HEALTH_COMMAND
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
