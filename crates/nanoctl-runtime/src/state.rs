//! Container state classification.
//!
//! Answers whether a cluster exists, runs, or has exited, from a fresh
//! listing that includes stopped containers.

use nanoctl_common::error::Result;
use nanoctl_common::types::{ContainerName, ContainerState};

use crate::engine::ContainerEngine;

/// Returns the state of the named container, or `None` if the engine does
/// not list it.
///
/// # Errors
///
/// Returns an error if the engine cannot be queried.
pub fn observe(engine: &dyn ContainerEngine, name: &ContainerName) -> Result<Option<ContainerState>> {
    let state = engine
        .list_containers(true)?
        .into_iter()
        .find(|c| c.names.iter().any(|n| name.matches(n)))
        .map(|c| c.state);
    tracing::debug!(container = %name, ?state, "observed container");
    Ok(state)
}

/// Returns `true` if the container is running or has exited.
///
/// # Errors
///
/// Returns an error if the engine cannot be queried.
pub fn exists(engine: &dyn ContainerEngine, name: &ContainerName) -> Result<bool> {
    Ok(matches!(
        observe(engine, name)?,
        Some(ContainerState::Running | ContainerState::Exited)
    ))
}

/// Returns `true` if the container is running.
///
/// # Errors
///
/// Returns an error if the engine cannot be queried.
pub fn is_running(engine: &dyn ContainerEngine, name: &ContainerName) -> Result<bool> {
    Ok(observe(engine, name)? == Some(ContainerState::Running))
}

/// Returns `true` if the container has exited.
///
/// # Errors
///
/// Returns an error if the engine cannot be queried.
pub fn has_exited(engine: &dyn ContainerEngine, name: &ContainerName) -> Result<bool> {
    Ok(observe(engine, name)? == Some(ContainerState::Exited))
}

/// Outcome of a command precondition.
///
/// A precondition that is not met is a normal outcome: the command has
/// nothing to do and ends successfully after showing the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// The command may proceed.
    Satisfied,
    /// The command stops here with a user-facing message.
    NotMet(String),
}

/// Requires the cluster to exist.
///
/// # Errors
///
/// Returns an error if the engine cannot be queried.
pub fn require_exists(engine: &dyn ContainerEngine, name: &ContainerName) -> Result<Precondition> {
    if exists(engine, name)? {
        return Ok(Precondition::Satisfied);
    }
    Ok(Precondition::NotMet(format!(
        "Cluster {} does not exist yet.",
        name.display_name()
    )))
}

/// Requires the cluster not to have exited.
///
/// # Errors
///
/// Returns an error if the engine cannot be queried.
pub fn require_running(engine: &dyn ContainerEngine, name: &ContainerName) -> Result<Precondition> {
    if has_exited(engine, name)? {
        return Ok(Precondition::NotMet(format!(
            "Cluster {} is not running.",
            name.display_name()
        )));
    }
    Ok(Precondition::Satisfied)
}
