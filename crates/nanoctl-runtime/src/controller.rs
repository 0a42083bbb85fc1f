//! Cluster controller composing the core into lifecycle operations.

use std::fmt;
use std::path::{Path, PathBuf};

use nanoctl_common::config::NanoConfig;
use nanoctl_common::constants::GATEWAY_PORT_ENV;
use nanoctl_common::error::{NanoError, Result};
use nanoctl_common::types::{self, ClusterName, ContainerField, ContainerName, ContainerState};

use crate::credentials;
use crate::engine::docker::DockerEngine;
use crate::engine::{ContainerEngine, ContainerSpec, RemoveContainerOptions, RemoveImageOptions};
use crate::identity::{self, ImageMetadata};
use crate::network::{AddressSource, SystemAddresses};
use crate::port::{self, GatewayPort, PortProbe, TcpPortProbe};
use crate::readiness::{
    GatewayProbe, HttpGatewayProbe, Phase, ReadinessOrchestrator, ReadinessOutcome,
};
use crate::state::{self, Precondition};

/// One row of the cluster listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterRow {
    /// Cluster name without prefix or separator.
    pub name: String,
    /// Reported container state.
    pub state: ContainerState,
    /// Metadata of the backing image.
    pub image: ImageMetadata,
}

/// Everything an operator needs to use a ready cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Cluster health summary.
    pub health: String,
    /// URL the gateway answers on.
    pub gateway_url: String,
    /// Gateway account name.
    pub user: String,
    /// Gateway access key.
    pub access_key: String,
    /// Gateway secret key.
    pub secret_key: String,
    /// Host working directory bound into the cluster.
    pub working_directory: String,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{} is the Ceph status", self.health)?;
        writeln!(f, "S3 object server address is: {}", self.gateway_url)?;
        writeln!(f, "S3 user is: {}", self.user)?;
        writeln!(f, "S3 access key is: {}", self.access_key)?;
        writeln!(f, "S3 secret key is: {}", self.secret_key)?;
        write!(f, "Your working directory is: {}", self.working_directory)
    }
}

/// Result of the status operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    /// The cluster is ready.
    Ready(StatusReport),
    /// The cluster is absent or stopped; nothing to report.
    NotMet(String),
    /// A readiness phase timed out.
    Unhealthy {
        /// Phase that gave up.
        phase: Phase,
        /// Log captured for the operator.
        diagnostic_log: String,
    },
}

/// Flags of the purge operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeOptions {
    /// The operator explicitly confirmed the purge.
    pub confirmed: bool,
    /// Also remove the image backing the cluster.
    pub remove_image: bool,
}

/// Result of the purge operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Confirmation missing; nothing was touched.
    Unconfirmed,
    /// The cluster does not exist.
    NotMet(String),
    /// Removal was attempted.
    Purged {
        /// Image whose removal was attempted, if requested.
        image: Option<String>,
    },
}

/// Overrides for the start operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Image to create the cluster from instead of the configured one.
    pub image: Option<String>,
    /// Working directory to bind instead of the configured one.
    pub working_dir: Option<PathBuf>,
}

/// Result of the start operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The cluster was already running.
    AlreadyRunning(String),
    /// An existing, stopped cluster was started again.
    Restarted,
    /// A new cluster container was created and started.
    Created {
        /// Gateway port bound on the host.
        port: u16,
        /// Image the cluster was created from.
        image: String,
    },
}

/// Progress of an image pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullEvent<'a> {
    /// The image is missing and is being pulled.
    Started(&'a str),
    /// A progress message from the engine.
    Progress(&'a str),
    /// The pull completed.
    Finished,
}

/// Coordinates every cluster operation.
///
/// Holds the engine and the two heuristics (address selection and port
/// probing) behind traits so each can be replaced independently.
pub struct Controller {
    engine: Box<dyn ContainerEngine>,
    addresses: Box<dyn AddressSource>,
    gateway_probe: Box<dyn GatewayProbe>,
    port_probe: Box<dyn PortProbe>,
    config: NanoConfig,
}

impl Controller {
    /// Creates a controller talking to the local Docker daemon.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine client or HTTP client cannot be built.
    pub fn new(config: NanoConfig) -> Result<Self> {
        let gateway_probe = HttpGatewayProbe::new(config.readiness.http_timeout())?;
        let port_probe = TcpPortProbe::new(config.ports.probe_timeout());
        Ok(Self::with_parts(
            config,
            Box::new(DockerEngine::connect()?),
            Box::new(SystemAddresses),
            Box::new(gateway_probe),
            Box::new(port_probe),
        ))
    }

    /// Creates a controller from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        config: NanoConfig,
        engine: Box<dyn ContainerEngine>,
        addresses: Box<dyn AddressSource>,
        gateway_probe: Box<dyn GatewayProbe>,
        port_probe: Box<dyn PortProbe>,
    ) -> Self {
        Self {
            engine,
            addresses,
            gateway_probe,
            port_probe,
            config,
        }
    }

    /// Returns the engine-facing name of a cluster.
    #[must_use]
    pub fn container_name(&self, cluster: &ClusterName) -> ContainerName {
        identity::resolve_container_name(&self.config.container_prefix, cluster)
    }

    /// Lists every cluster, running or not, with its image metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails. A missing image is not an error.
    pub fn list(&self) -> Result<Vec<ClusterRow>> {
        let prefix = &self.config.container_prefix;
        let mut rows = Vec::new();
        for container in self.engine.list_containers(true)? {
            let names: Vec<&str> = container
                .names
                .iter()
                .filter_map(|n| types::display_name(n, prefix))
                .collect();
            if names.is_empty() {
                continue;
            }
            let image = identity::image_metadata(self.engine.as_ref(), &container.image_id)?;
            rows.extend(names.into_iter().map(|name| ClusterRow {
                name: name.to_string(),
                state: container.state.clone(),
                image: image.clone(),
            }));
        }
        tracing::debug!(count = rows.len(), "listed clusters");
        Ok(rows)
    }

    /// Waits until the cluster is internally and externally healthy.
    ///
    /// # Errors
    ///
    /// Returns an error on engine or network failure.
    pub fn readiness(&self, name: &ContainerName) -> Result<ReadinessOutcome> {
        ReadinessOrchestrator::new(
            self.engine.as_ref(),
            self.addresses.as_ref(),
            self.gateway_probe.as_ref(),
            &self.config,
        )
        .run(name)
    }

    /// Confirms the cluster is ready and gathers its access details.
    ///
    /// # Errors
    ///
    /// Returns an error on engine or network failure, or if the cluster's
    /// credentials or bind mount are unusable.
    pub fn status(&self, cluster: &ClusterName) -> Result<StatusOutcome> {
        let name = self.container_name(cluster);
        let engine = self.engine.as_ref();
        if let Precondition::NotMet(message) = state::require_exists(engine, &name)? {
            return Ok(StatusOutcome::NotMet(message));
        }
        if let Precondition::NotMet(message) = state::require_running(engine, &name)? {
            return Ok(StatusOutcome::NotMet(message));
        }

        let gateway_url = match self.readiness(&name)? {
            ReadinessOutcome::Healthy { gateway_url } => gateway_url,
            ReadinessOutcome::Timeout {
                phase,
                diagnostic_log,
                ..
            } => {
                return Ok(StatusOutcome::Unhealthy {
                    phase,
                    diagnostic_log,
                });
            }
        };

        let gateway = &self.config.gateway;
        let keys = credentials::fetch_credentials(engine, &name, &gateway.credentials_path)?;
        let health = engine.exec(name.as_str(), &gateway.health_command)?.text();
        let working_directory =
            identity::inspect_container_field(engine, &name, ContainerField::WorkingDirectory)?;

        Ok(StatusOutcome::Ready(StatusReport {
            health,
            gateway_url,
            user: gateway.user.clone(),
            access_key: keys.access_key,
            secret_key: keys.secret_key,
            working_directory,
        }))
    }

    /// Removes the cluster container and, optionally, its image.
    ///
    /// Removal failures are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check or the image lookup fails.
    pub fn purge(&self, cluster: &ClusterName, options: PurgeOptions) -> Result<PurgeOutcome> {
        if !options.confirmed {
            return Ok(PurgeOutcome::Unconfirmed);
        }
        let name = self.container_name(cluster);
        let engine = self.engine.as_ref();
        if let Precondition::NotMet(message) = state::require_exists(engine, &name)? {
            return Ok(PurgeOutcome::NotMet(message));
        }

        let image = if options.remove_image {
            Some(identity::inspect_container_field(
                engine,
                &name,
                ContainerField::Image,
            )?)
        } else {
            None
        };

        let container_options = RemoveContainerOptions {
            force: true,
            remove_volumes: true,
            remove_links: false,
        };
        match engine.remove_container(name.as_str(), container_options) {
            Ok(()) => tracing::info!(container = %name, "container removed"),
            Err(e) => tracing::warn!(container = %name, error = %e, "container removal failed"),
        }

        if let Some(image) = &image {
            let image_options = RemoveImageOptions {
                force: true,
                prune_children: true,
            };
            match engine.remove_image(image, image_options) {
                Ok(()) => tracing::info!(image = %image, "image removed"),
                Err(e) => tracing::warn!(image = %image, error = %e, "image removal failed"),
            }
        }

        Ok(PurgeOutcome::Purged { image })
    }

    /// Starts a cluster, creating it first if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be pulled, no gateway port is
    /// free, the working directory cannot be prepared, or the engine fails.
    pub fn start(
        &self,
        cluster: &ClusterName,
        options: &StartOptions,
        on_pull: &mut dyn FnMut(PullEvent<'_>),
    ) -> Result<StartOutcome> {
        let name = self.container_name(cluster);
        match state::observe(self.engine.as_ref(), &name)? {
            Some(ContainerState::Running) => Ok(StartOutcome::AlreadyRunning(format!(
                "Cluster {} is already running!",
                name.display_name()
            ))),
            Some(_) => {
                self.engine.start_container(name.as_str())?;
                Ok(StartOutcome::Restarted)
            }
            None => self.create(&name, options, on_pull),
        }
    }

    fn create(
        &self,
        name: &ContainerName,
        options: &StartOptions,
        on_pull: &mut dyn FnMut(PullEvent<'_>),
    ) -> Result<StartOutcome> {
        let image = options
            .image
            .clone()
            .unwrap_or_else(|| self.config.image.clone());
        if self.ensure_image(&image, on_pull)? {
            tracing::info!(image = %image, "image pulled");
        }

        let GatewayPort::Free(port) = self.allocate_gateway_port() else {
            return Err(NanoError::NotFound {
                kind: "free gateway port",
                id: format!("{}-{}", self.config.ports.min, self.config.ports.max),
            });
        };

        let working_dir =
            prepare_working_dir(options.working_dir.as_deref().unwrap_or(&self.config.working_dir))?;
        let gateway = &self.config.gateway;
        let spec = ContainerSpec {
            name: name.as_str().to_string(),
            image: image.clone(),
            env: vec![
                format!("{GATEWAY_PORT_ENV}={port}"),
                format!("CEPH_DEMO_UID={}", gateway.user),
                "NETWORK_AUTO_DETECT=4".to_string(),
                "CEPH_DAEMON=demo".to_string(),
            ],
            binds: vec![format!("{}:{}", working_dir.display(), gateway.data_dir)],
            port,
        };

        self.engine.create_container(&spec)?;
        self.engine.start_container(name.as_str())?;
        Ok(StartOutcome::Created { port, image })
    }

    /// Pulls `image` unless it is already present. Returns whether a pull
    /// happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or the pull fails.
    pub fn ensure_image(&self, image: &str, on_pull: &mut dyn FnMut(PullEvent<'_>)) -> Result<bool> {
        match self.engine.inspect_image(image) {
            Ok(_) => Ok(false),
            Err(e) if e.is_image_not_found() => {
                on_pull(PullEvent::Started(image));
                self.engine
                    .pull_image(image, &mut |message: &str| on_pull(PullEvent::Progress(message)))?;
                on_pull(PullEvent::Finished);
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    /// Scans the configured range for a free gateway port.
    #[must_use]
    pub fn allocate_gateway_port(&self) -> GatewayPort {
        port::allocate_gateway_port(self.config.ports.range(), self.port_probe.as_ref())
    }
}

/// Creates the working directory if needed and returns its absolute path.
fn prepare_working_dir(dir: &Path) -> Result<PathBuf> {
    let io_error = |e| NanoError::Io {
        path: dir.to_path_buf(),
        source: e,
    };
    std::fs::create_dir_all(dir).map_err(io_error)?;
    std::fs::canonicalize(dir).map_err(io_error)
}
