//! Gateway credentials stored inside the cluster container.

use nanoctl_common::error::{NanoError, Result};
use nanoctl_common::types::ContainerName;
use serde::Deserialize;

use crate::engine::ContainerEngine;

/// An access/secret key pair of the gateway account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyPair {
    /// Access key.
    #[serde(rename = "Access_key")]
    pub access_key: String,
    /// Secret key.
    #[serde(rename = "Secret_key")]
    pub secret_key: String,
}

#[derive(Debug, Deserialize)]
struct CredentialsDocument {
    #[serde(rename = "Keys", default)]
    keys: Vec<KeyPair>,
}

/// Parses the credentials document and returns its first key pair.
///
/// # Errors
///
/// Returns an error if the document is not valid JSON or lists no keys.
pub fn parse_credentials(raw: &[u8]) -> Result<KeyPair> {
    let document: CredentialsDocument = serde_json::from_slice(raw)?;
    document
        .keys
        .into_iter()
        .next()
        .ok_or_else(|| NanoError::MissingField {
            resource: "credentials document".into(),
            field: "Keys",
        })
}

/// Reads the credentials document from inside the container.
///
/// # Errors
///
/// Returns an error if the exec fails or the document is unusable.
pub fn fetch_credentials(
    engine: &dyn ContainerEngine,
    name: &ContainerName,
    path: &str,
) -> Result<KeyPair> {
    let output = engine.exec(name.as_str(), &["cat".to_string(), path.to_string()])?;
    parse_credentials(output.as_bytes())
}
