//! Docker engine backend.
//!
//! bollard is asynchronous; every call is driven to completion on a
//! private current-thread runtime so callers stay blocking. bollard also
//! strips the 8-byte multiplexed-stream header from each exec and log
//! chunk, so the bytes handed back are plain output.

use std::collections::HashMap;
use std::pin::pin;

use bollard::Docker;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions, LogsOptions,
    StartContainerOptions,
};
use bollard::errors::Error as DockerError;
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding};
use futures::{StreamExt, TryStreamExt};
use nanoctl_common::error::{NanoError, Result};
use nanoctl_common::types::ContainerState;
use tokio::runtime::Runtime;

use super::{
    ContainerDetails, ContainerEngine, ContainerSpec, ContainerSummary, ImageDetails,
    RemoveContainerOptions, RemoveImageOptions,
};
use crate::exec::ExecOutput;

/// Engine backed by the local Docker daemon.
pub struct DockerEngine {
    docker: Docker,
    runtime: Runtime,
}

impl DockerEngine {
    /// Connects to the daemon using the platform defaults (`DOCKER_HOST`
    /// or the local socket).
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be built or the client
    /// cannot be configured.
    pub fn connect() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| NanoError::Io {
                path: "tokio runtime".into(),
                source: e,
            })?;
        let docker = {
            let _guard = runtime.enter();
            Docker::connect_with_local_defaults().map_err(engine_error)?
        };
        tracing::debug!("connected to docker daemon");
        Ok(Self { docker, runtime })
    }
}

fn engine_error(err: DockerError) -> NanoError {
    NanoError::Engine {
        message: err.to_string(),
    }
}

const fn is_not_found(err: &DockerError) -> bool {
    matches!(
        err,
        DockerError::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

impl ContainerEngine for DockerEngine {
    fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>> {
        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };
        let containers = self
            .runtime
            .block_on(self.docker.list_containers(Some(options)))
            .map_err(engine_error)?;
        tracing::debug!(count = containers.len(), all, "listed containers");

        Ok(containers
            .into_iter()
            .map(|c| ContainerSummary {
                names: c.names.unwrap_or_default(),
                state: ContainerState::from(c.state.as_deref().unwrap_or_default()),
                image_id: c.image_id.unwrap_or_default(),
            })
            .collect())
    }

    fn inspect_container(&self, name: &str) -> Result<ContainerDetails> {
        let inspect = self
            .runtime
            .block_on(
                self.docker
                    .inspect_container(name, None::<InspectContainerOptions>),
            )
            .map_err(|e| {
                if is_not_found(&e) {
                    NanoError::NotFound {
                        kind: "container",
                        id: name.to_string(),
                    }
                } else {
                    engine_error(e)
                }
            })?;

        let config = inspect.config.unwrap_or_default();
        Ok(ContainerDetails {
            name: name.to_string(),
            binds: inspect
                .host_config
                .and_then(|h| h.binds)
                .unwrap_or_default(),
            env: config.env.unwrap_or_default(),
            image: config.image.unwrap_or_default(),
        })
    }

    fn inspect_image(&self, reference: &str) -> Result<ImageDetails> {
        let image = self
            .runtime
            .block_on(self.docker.inspect_image(reference))
            .map_err(|e| {
                if is_not_found(&e) {
                    NanoError::NotFound {
                        kind: "image",
                        id: reference.to_string(),
                    }
                } else {
                    engine_error(e)
                }
            })?;

        Ok(ImageDetails {
            repo_tags: image.repo_tags.unwrap_or_default(),
            repo_digests: image.repo_digests.unwrap_or_default(),
            created: image.created.unwrap_or_default(),
            labels: image.config.and_then(|c| c.labels).unwrap_or_default(),
        })
    }

    fn exec(&self, name: &str, cmd: &[String]) -> Result<ExecOutput> {
        tracing::debug!(container = name, ?cmd, "exec");
        let options = CreateExecOptions {
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            cmd: Some(cmd.to_vec()),
            ..Default::default()
        };

        let bytes = self
            .runtime
            .block_on(async {
                let exec = self.docker.create_exec(name, options).await?;
                let mut bytes = Vec::new();
                if let StartExecResults::Attached { mut output, .. } =
                    self.docker.start_exec(&exec.id, None).await?
                {
                    while let Some(chunk) = output.next().await {
                        bytes.extend_from_slice(&chunk?.into_bytes());
                    }
                }
                Ok::<_, DockerError>(bytes)
            })
            .map_err(engine_error)?;
        Ok(ExecOutput::new(bytes))
    }

    fn logs(&self, name: &str) -> Result<String> {
        let options = LogsOptions::<String> {
            stdout: true,
            ..Default::default()
        };
        let chunks: Vec<_> = self
            .runtime
            .block_on(self.docker.logs(name, Some(options)).try_collect())
            .map_err(engine_error)?;

        let bytes: Vec<u8> = chunks
            .into_iter()
            .flat_map(|chunk| chunk.into_bytes())
            .collect();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<()> {
        tracing::info!(container = %spec.name, image = %spec.image, port = spec.port, "creating container");
        let port_key = format!("{}/tcp", spec.port);
        let port_bindings = HashMap::from([(
            port_key.clone(),
            Some(vec![PortBinding {
                host_ip: Some("0.0.0.0".to_string()),
                host_port: Some(spec.port.to_string()),
            }]),
        )]);
        let config = Config {
            image: Some(spec.image.clone()),
            env: Some(spec.env.clone()),
            exposed_ports: Some(HashMap::from([(port_key, HashMap::new())])),
            host_config: Some(HostConfig {
                binds: Some(spec.binds.clone()),
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        };
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };

        let _ = self
            .runtime
            .block_on(self.docker.create_container(Some(options), config))
            .map_err(engine_error)?;
        Ok(())
    }

    fn start_container(&self, name: &str) -> Result<()> {
        tracing::info!(container = name, "starting container");
        self.runtime
            .block_on(
                self.docker
                    .start_container(name, None::<StartContainerOptions<String>>),
            )
            .map_err(engine_error)
    }

    fn remove_container(&self, name: &str, options: RemoveContainerOptions) -> Result<()> {
        let options = bollard::container::RemoveContainerOptions {
            v: options.remove_volumes,
            force: options.force,
            link: options.remove_links,
        };
        self.runtime
            .block_on(self.docker.remove_container(name, Some(options)))
            .map_err(engine_error)
    }

    fn remove_image(&self, reference: &str, options: RemoveImageOptions) -> Result<()> {
        let options = bollard::image::RemoveImageOptions {
            force: options.force,
            noprune: !options.prune_children,
        };
        let removed = self
            .runtime
            .block_on(self.docker.remove_image(reference, Some(options), None))
            .map_err(engine_error)?;
        tracing::debug!(image = reference, layers = removed.len(), "image removed");
        Ok(())
    }

    fn pull_image(&self, reference: &str, progress: &mut dyn FnMut(&str)) -> Result<()> {
        tracing::info!(image = reference, "pulling image");
        let options = CreateImageOptions {
            from_image: reference.to_string(),
            ..Default::default()
        };

        self.runtime
            .block_on(async {
                let mut stream = pin!(self.docker.create_image(Some(options), None, None));
                while let Some(info) = stream.next().await {
                    let info = info?;
                    progress(info.status.as_deref().unwrap_or_default());
                }
                Ok::<_, DockerError>(())
            })
            .map_err(engine_error)
    }
}
