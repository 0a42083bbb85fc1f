//! Cluster and image identity resolution.
//!
//! Image metadata degrades gracefully: listing must keep rendering rows
//! for clusters whose image has been deleted, so a missing image yields
//! sentinel strings instead of an error. Any other engine failure is
//! propagated.

use nanoctl_common::constants::{
    DIGEST_SCHEME_PREFIX, IMAGE_NOT_PRESENT, RELEASE_LABEL, UNKNOWN_RELEASE,
};
use nanoctl_common::error::{NanoError, Result};
use nanoctl_common::types::{ClusterName, ContainerField, ContainerName, ImageField};

use crate::engine::{ContainerDetails, ContainerEngine, ImageDetails};

/// Composes the engine-facing container name for a cluster.
#[must_use]
pub fn resolve_container_name(prefix: &str, cluster: &ClusterName) -> ContainerName {
    ContainerName::new(prefix, cluster)
}

/// Strips the digest scheme (`sha256:`) from an image ID so it can be used
/// as an image lookup key.
#[must_use]
pub fn strip_digest_scheme(image_id: &str) -> &str {
    image_id
        .strip_prefix(DIGEST_SCHEME_PREFIX)
        .unwrap_or(image_id)
}

/// Display metadata of the image backing a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Tag, repository digest, or the not-present sentinel.
    pub tag: String,
    /// Creation timestamp, verbatim.
    pub created: String,
    /// Release label or the unknown-release sentinel.
    pub release: String,
}

impl ImageMetadata {
    /// Extracts all fields from an inspected image.
    #[must_use]
    pub fn from_details(details: &ImageDetails) -> Self {
        Self {
            tag: image_field(details, ImageField::Tag),
            created: image_field(details, ImageField::Created),
            release: image_field(details, ImageField::Release),
        }
    }

    /// Metadata reported for an image that no longer exists.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            tag: IMAGE_NOT_PRESENT.to_string(),
            created: IMAGE_NOT_PRESENT.to_string(),
            release: IMAGE_NOT_PRESENT.to_string(),
        }
    }
}

/// Extracts one field from an inspected image.
#[must_use]
pub fn image_field(details: &ImageDetails, field: ImageField) -> String {
    match field {
        ImageField::Tag if details.repo_tags.is_empty() => details.repo_digests.concat(),
        ImageField::Tag => details.repo_tags.concat(),
        ImageField::Created => details.created.clone(),
        ImageField::Release => details
            .labels
            .get(RELEASE_LABEL)
            .filter(|release| !release.is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_RELEASE.to_string()),
    }
}

/// Looks up all display metadata of an image in a single inspection.
///
/// # Errors
///
/// Returns an error for any engine failure other than a missing image.
pub fn image_metadata(engine: &dyn ContainerEngine, image_id: &str) -> Result<ImageMetadata> {
    match engine.inspect_image(strip_digest_scheme(image_id)) {
        Ok(details) => Ok(ImageMetadata::from_details(&details)),
        Err(e) if e.is_image_not_found() => {
            tracing::debug!(image = image_id, "image no longer present");
            Ok(ImageMetadata::missing())
        }
        Err(e) => Err(e),
    }
}

/// Looks up a single image field.
///
/// # Errors
///
/// Returns an error for any engine failure other than a missing image.
pub fn inspect_image(
    engine: &dyn ContainerEngine,
    image_id: &str,
    field: ImageField,
) -> Result<String> {
    match engine.inspect_image(strip_digest_scheme(image_id)) {
        Ok(details) => Ok(image_field(&details, field)),
        Err(e) if e.is_image_not_found() => Ok(IMAGE_NOT_PRESENT.to_string()),
        Err(e) => Err(e),
    }
}

/// Extracts one field from an inspected container.
///
/// # Errors
///
/// Returns [`NanoError::MissingField`] if the container has no bind mount,
/// no environment entry, or no `KEY=VALUE` separator in its first entry.
pub fn container_field(details: &ContainerDetails, field: ContainerField) -> Result<String> {
    let missing = |field| NanoError::MissingField {
        resource: details.name.clone(),
        field,
    };
    match field {
        ContainerField::WorkingDirectory => details
            .binds
            .first()
            .map(|bind| bind.split(':').next().unwrap_or_default().to_string())
            .ok_or_else(|| missing("bind mount")),
        ContainerField::GatewayPort => details
            .env
            .first()
            .and_then(|entry| entry.split_once('='))
            .map(|(_, value)| value.to_string())
            .ok_or_else(|| missing("gateway port environment entry")),
        ContainerField::Image => Ok(details.image.clone()),
    }
}

/// Inspects a container and extracts one field. The container must exist.
///
/// # Errors
///
/// Returns an error if inspection fails or the field is absent.
pub fn inspect_container_field(
    engine: &dyn ContainerEngine,
    name: &ContainerName,
    field: ContainerField,
) -> Result<String> {
    let details = engine.inspect_container(name.as_str())?;
    container_field(&details, field)
}
