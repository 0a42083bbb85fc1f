//! Unified error types for the nanoctl workspace.
//!
//! Image absence is deliberately a distinct [`NanoError::NotFound`] so the
//! identity resolver can degrade it into a status message instead of
//! failing the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum NanoError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The container engine rejected or failed a request.
    #[error("container engine error: {message}")]
    Engine {
        /// Message reported by the engine client.
        message: String,
    },

    /// Local network interfaces could not be enumerated.
    #[error("unable to determine network interface address: {message}")]
    Network {
        /// Description of the enumeration failure.
        message: String,
    },

    /// An HTTP request failed.
    #[error("request to {url} failed: {message}")]
    Http {
        /// URL that was requested.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// No IPv4 address is available to advertise the gateway on.
    #[error("no usable IPv4 address found on this host")]
    NoUsableAddress,

    /// A container or document lacks a field the caller depends on.
    #[error("{resource} has no {field}")]
    MissingField {
        /// Resource that was inspected.
        resource: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A TOML configuration file could not be parsed.
    #[error("configuration file error: {source}")]
    Toml {
        /// Underlying TOML error.
        #[from]
        source: toml::de::Error,
    },
}

impl NanoError {
    /// Returns `true` when the error reports a missing image.
    #[must_use]
    pub fn is_image_not_found(&self) -> bool {
        matches!(self, Self::NotFound { kind: "image", .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, NanoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_not_found_is_recognized() {
        let err = NanoError::NotFound {
            kind: "image",
            id: "abc".into(),
        };
        assert!(err.is_image_not_found());
    }

    #[test]
    fn container_not_found_is_not_an_image_miss() {
        let err = NanoError::NotFound {
            kind: "container",
            id: "abc".into(),
        };
        assert!(!err.is_image_not_found());
    }

    #[test]
    fn missing_field_message_names_resource_and_field() {
        let err = NanoError::MissingField {
            resource: "ceph-nano-foo".into(),
            field: "bind mount",
        };
        assert_eq!(err.to_string(), "ceph-nano-foo has no bind mount");
    }
}
