//! Container log capture.
//!
//! Two sources matter: the container's own stdout, which carries the
//! readiness marker, and the gateway log file inside the container.

use nanoctl_common::error::Result;
use nanoctl_common::types::ContainerName;

use crate::engine::ContainerEngine;

/// Returns the full stdout log of a cluster container.
///
/// # Errors
///
/// Returns an error if the engine cannot stream the logs.
pub fn container_log(engine: &dyn ContainerEngine, name: &ContainerName) -> Result<String> {
    engine.logs(name.as_str())
}

/// Returns the gateway log, read by running `command` inside the container.
///
/// # Errors
///
/// Returns an error if the exec fails.
pub fn gateway_log(
    engine: &dyn ContainerEngine,
    name: &ContainerName,
    command: &[String],
) -> Result<String> {
    let output = engine.exec(name.as_str(), command)?;
    Ok(String::from_utf8_lossy(output.as_bytes()).into_owned())
}

/// Returns `true` if the log contains the readiness marker.
#[must_use]
pub fn contains_marker(log: &str, marker: &str) -> bool {
    log.contains(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_found_anywhere_in_log() {
        let log = "starting mon\nstarting osd\nSUCCESS\n";
        assert!(contains_marker(log, "SUCCESS"));
    }

    #[test]
    fn marker_absent_from_log() {
        assert!(!contains_marker("starting mon\n", "SUCCESS"));
        assert!(!contains_marker("", "SUCCESS"));
    }

    #[test]
    fn marker_match_is_case_sensitive() {
        assert!(!contains_marker("success", "SUCCESS"));
    }
}
