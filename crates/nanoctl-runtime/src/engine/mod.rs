//! Container engine abstraction.
//!
//! The engine is the sole source of truth: every observation is fetched
//! fresh through [`ContainerEngine`] and never cached.

pub mod docker;

use std::collections::HashMap;

use nanoctl_common::error::Result;
use nanoctl_common::types::ContainerState;

use crate::exec::ExecOutput;

/// One container as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    /// Names reported by the engine, possibly with a leading separator.
    pub names: Vec<String>,
    /// Reported state.
    pub state: ContainerState,
    /// Image identifier, usually carrying a digest scheme prefix.
    pub image_id: String,
}

/// The parts of a container inspection the core relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDetails {
    /// Container name.
    pub name: String,
    /// Bind mounts in `host:container[:mode]` form.
    pub binds: Vec<String>,
    /// Environment entries in `KEY=VALUE` form.
    pub env: Vec<String>,
    /// Image reference the container was created from.
    pub image: String,
}

/// The parts of an image inspection the core relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDetails {
    /// Repository tags (`repo:tag`).
    pub repo_tags: Vec<String>,
    /// Repository digests (`repo@sha256:...`).
    pub repo_digests: Vec<String>,
    /// Creation timestamp as reported by the engine.
    pub created: String,
    /// Image labels.
    pub labels: HashMap<String, String>,
}

/// Everything needed to create a cluster container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Container name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Environment entries; the first one carries the gateway port.
    pub env: Vec<String>,
    /// Bind mounts in `host:container` form.
    pub binds: Vec<String>,
    /// Gateway port, published on the same host port.
    pub port: u16,
}

/// Options for container removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveContainerOptions {
    /// Kill the container if it is running.
    pub force: bool,
    /// Remove anonymous volumes attached to the container.
    pub remove_volumes: bool,
    /// Remove the link instead of the container.
    pub remove_links: bool,
}

/// Options for image removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveImageOptions {
    /// Remove the image even if it is referenced.
    pub force: bool,
    /// Delete untagged parent images.
    pub prune_children: bool,
}

/// Synchronous access to the container engine.
///
/// Every call blocks until the engine answers. Implementors must map a
/// missing image to `NanoError::NotFound { kind: "image", .. }`.
pub trait ContainerEngine: Send + Sync {
    /// Lists containers, including stopped ones when `all` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be queried.
    fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>>;

    /// Inspects a container by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the container does not exist or the engine fails.
    fn inspect_container(&self, name: &str) -> Result<ContainerDetails>;

    /// Inspects an image by ID or reference.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the image is gone, or an engine error.
    fn inspect_image(&self, reference: &str) -> Result<ImageDetails>;

    /// Runs a command inside a running container, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if the exec cannot be created or attached.
    fn exec(&self, name: &str, cmd: &[String]) -> Result<ExecOutput>;

    /// Returns the full stdout log of a container.
    ///
    /// # Errors
    ///
    /// Returns an error if logs cannot be retrieved.
    fn logs(&self, name: &str) -> Result<String>;

    /// Creates a container without starting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses the container.
    fn create_container(&self, spec: &ContainerSpec) -> Result<()>;

    /// Starts a created or exited container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be started.
    fn start_container(&self, name: &str) -> Result<()>;

    /// Removes a container.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses the removal.
    fn remove_container(&self, name: &str, options: RemoveContainerOptions) -> Result<()>;

    /// Removes an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses the removal.
    fn remove_image(&self, reference: &str, options: RemoveImageOptions) -> Result<()>;

    /// Pulls an image, reporting each progress message to `progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull fails.
    fn pull_image(&self, reference: &str, progress: &mut dyn FnMut(&str)) -> Result<()>;
}
