//! Readiness orchestration for a freshly started cluster.
//!
//! A cluster is ready once two signals have been observed in order:
//!
//! 1. **Internal health**: the readiness marker appears in the container
//!    log. Polled once per interval up to the internal ceiling.
//! 2. **External health**: an HTTP GET against the advertised gateway URL
//!    returns a readable response. Polled up to the external ceiling.
//!
//! ```text
//! Started ──marker seen──▶ InternalHealthy ──gateway answers──▶ ExternalHealthy
//!    │                           │
//!    └──ceiling reached──────────┴──────────▶ Unhealthy
//! ```
//!
//! Polling is sequential and blocking with fixed spacing. Running out of
//! attempts is reported as [`ReadinessOutcome::Timeout`] carrying the log
//! an operator needs; deciding to abort is left to the caller.

use std::fmt;
use std::time::Duration;

use nanoctl_common::config::NanoConfig;
use nanoctl_common::error::{NanoError, Result};
use nanoctl_common::types::{ContainerField, ContainerName};

use crate::engine::ContainerEngine;
use crate::identity;
use crate::logs;
use crate::network::{self, AddressSource};

/// States of the readiness state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    /// Container started, nothing observed yet.
    Started,
    /// Readiness marker seen in the container log.
    InternalHealthy,
    /// Gateway answered over HTTP.
    ExternalHealthy,
    /// A phase ran out of attempts.
    Unhealthy,
}

/// Polling phase that produced a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the readiness marker.
    Internal,
    /// Waiting for the gateway to answer.
    External,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal health"),
            Self::External => write!(f, "gateway health"),
        }
    }
}

/// Terminal result of a readiness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// Both signals observed.
    Healthy {
        /// URL the gateway answered on.
        gateway_url: String,
    },
    /// A phase exhausted its attempts.
    Timeout {
        /// Phase that gave up.
        phase: Phase,
        /// Number of polls performed in that phase.
        attempts: u32,
        /// Container log (internal phase) or gateway log (external phase).
        diagnostic_log: String,
    },
}

impl ReadinessOutcome {
    /// Returns the terminal state this outcome corresponds to.
    #[must_use]
    pub const fn state(&self) -> ReadinessState {
        match self {
            Self::Healthy { .. } => ReadinessState::ExternalHealthy,
            Self::Timeout { .. } => ReadinessState::Unhealthy,
        }
    }
}

/// Checks whether the gateway answers on a URL.
pub trait GatewayProbe: Send + Sync {
    /// Returns `true` if a GET delivered a status and a fully readable body.
    fn probe(&self, url: &str) -> bool;
}

/// Probes the gateway with a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpGatewayProbe {
    client: reqwest::blocking::Client,
}

impl HttpGatewayProbe {
    /// Builds a probe whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NanoError::Http {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl GatewayProbe for HttpGatewayProbe {
    fn probe(&self, url: &str) -> bool {
        match self.client.get(url).send().and_then(|r| r.bytes()) {
            Ok(_) => true,
            Err(e) => {
                tracing::trace!(url, error = %e, "gateway probe failed");
                false
            }
        }
    }
}

/// Builds the gateway URL from the advertised address and bound port.
#[must_use]
pub fn gateway_url(address: impl fmt::Display, port: &str) -> String {
    format!("http://{address}:{port}")
}

/// Drives a cluster through both readiness phases.
pub struct ReadinessOrchestrator<'a> {
    engine: &'a dyn ContainerEngine,
    addresses: &'a dyn AddressSource,
    probe: &'a dyn GatewayProbe,
    config: &'a NanoConfig,
}

impl<'a> ReadinessOrchestrator<'a> {
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub const fn new(
        engine: &'a dyn ContainerEngine,
        addresses: &'a dyn AddressSource,
        probe: &'a dyn GatewayProbe,
        config: &'a NanoConfig,
    ) -> Self {
        Self {
            engine,
            addresses,
            probe,
            config,
        }
    }

    /// Runs both phases to a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails, the gateway port cannot be
    /// read from the container, or no address can be advertised. Those are
    /// not timeouts: nothing was polled long enough to conclude anything.
    pub fn run(&self, name: &ContainerName) -> Result<ReadinessOutcome> {
        let mut state = ReadinessState::Started;
        tracing::info!(container = %name, ?state, "waiting for cluster");

        let readiness = &self.config.readiness;
        let Some(attempt) = self.wait_internal(name)? else {
            transition(name, &mut state, ReadinessState::Unhealthy);
            return Ok(ReadinessOutcome::Timeout {
                phase: Phase::Internal,
                attempts: readiness.internal_poll_ceiling,
                diagnostic_log: logs::container_log(self.engine, name)?,
            });
        };
        tracing::debug!(container = %name, attempt, "readiness marker found");
        transition(name, &mut state, ReadinessState::InternalHealthy);

        let port =
            identity::inspect_container_field(self.engine, name, ContainerField::GatewayPort)?;
        let address = network::advertise_address(self.addresses)?;
        let url = gateway_url(address, &port);

        let Some(attempt) = self.wait_external(&url) else {
            transition(name, &mut state, ReadinessState::Unhealthy);
            return Ok(ReadinessOutcome::Timeout {
                phase: Phase::External,
                attempts: readiness.external_poll_ceiling,
                diagnostic_log: logs::gateway_log(
                    self.engine,
                    name,
                    &self.config.gateway.log_command,
                )?,
            });
        };
        tracing::debug!(container = %name, attempt, url = %url, "gateway answered");
        transition(name, &mut state, ReadinessState::ExternalHealthy);

        Ok(ReadinessOutcome::Healthy { gateway_url: url })
    }

    /// Polls the container log for the marker. Returns the attempt it was
    /// found on.
    fn wait_internal(&self, name: &ContainerName) -> Result<Option<u32>> {
        let readiness = &self.config.readiness;
        poll(readiness.internal_poll_ceiling, readiness.poll_interval(), || {
            let log = logs::container_log(self.engine, name)?;
            Ok(logs::contains_marker(&log, &readiness.marker))
        })
    }

    /// Probes the gateway URL. Returns the attempt it answered on.
    fn wait_external(&self, url: &str) -> Option<u32> {
        let readiness = &self.config.readiness;
        poll(readiness.external_poll_ceiling, readiness.poll_interval(), || {
            Ok(self.probe.probe(url))
        })
        .unwrap_or_default()
    }
}

fn transition(name: &ContainerName, state: &mut ReadinessState, next: ReadinessState) {
    tracing::info!(container = %name, from = ?*state, to = ?next, "readiness transition");
    *state = next;
}

/// Calls `check` up to `ceiling` times, sleeping `interval` between
/// attempts, and returns the 1-based attempt that succeeded.
fn poll(
    ceiling: u32,
    interval: Duration,
    mut check: impl FnMut() -> Result<bool>,
) -> Result<Option<u32>> {
    for attempt in 1..=ceiling {
        if check()? {
            return Ok(Some(attempt));
        }
        tracing::trace!(attempt, ceiling, "not ready yet");
        if attempt < ceiling {
            std::thread::sleep(interval);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn poll_stops_on_first_success() {
        let calls = Cell::new(0);
        let found = poll(60, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            Ok(calls.get() == 3)
        })
        .expect("poll");
        assert_eq!(found, Some(3));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn poll_gives_up_at_ceiling() {
        let calls = Cell::new(0);
        let found = poll(5, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            Ok(false)
        })
        .expect("poll");
        assert_eq!(found, None);
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn poll_propagates_check_errors() {
        let result = poll(5, Duration::ZERO, || Err(NanoError::NoUsableAddress));
        assert!(result.is_err());
    }

    #[test]
    fn gateway_url_joins_address_and_port() {
        let addr = std::net::Ipv4Addr::new(192, 168, 0, 10);
        assert_eq!(gateway_url(addr, "8000"), "http://192.168.0.10:8000");
    }

    #[test]
    fn outcome_maps_to_terminal_state() {
        let healthy = ReadinessOutcome::Healthy {
            gateway_url: "http://x:1".into(),
        };
        let timeout = ReadinessOutcome::Timeout {
            phase: Phase::External,
            attempts: 30,
            diagnostic_log: String::new(),
        };
        assert_eq!(healthy.state(), ReadinessState::ExternalHealthy);
        assert_eq!(timeout.state(), ReadinessState::Unhealthy);
    }
}
