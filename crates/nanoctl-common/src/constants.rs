//! System-wide constants and default values.

/// Prefix prepended to every logical cluster name to form the container name.
pub const CONTAINER_NAME_PREFIX: &str = "ceph-nano-";

/// Separator the engine prepends to container names in listings.
pub const NAME_SEPARATOR: char = '/';

/// Default container image for new clusters.
pub const DEFAULT_IMAGE: &str = "ceph/daemon:latest";

/// Token the storage service writes to its log once it is initialized.
pub const READINESS_MARKER: &str = "SUCCESS";

/// Maximum number of log polls before the internal health phase gives up.
pub const INTERNAL_POLL_CEILING: u32 = 60;

/// Maximum number of HTTP probes before the gateway health phase gives up.
pub const EXTERNAL_POLL_CEILING: u32 = 30;

/// Spacing between two readiness polls, in milliseconds.
pub const POLL_INTERVAL_MS: u64 = 1000;

/// First port of the gateway port scan (inclusive).
pub const GATEWAY_PORT_MIN: u16 = 8000;

/// Last port of the gateway port scan (inclusive).
pub const GATEWAY_PORT_MAX: u16 = 8100;

/// Connection timeout used when probing a candidate port, in milliseconds.
pub const PORT_PROBE_TIMEOUT_MS: u64 = 1000;

/// Timeout applied to a single gateway HTTP probe, in milliseconds.
pub const HTTP_PROBE_TIMEOUT_MS: u64 = 5000;

/// Sentinel reported when the port scan finds no free port.
pub const PORT_NOT_FOUND: &str = "notfound";

/// In-container path of the JSON document holding the gateway keys.
pub const CREDENTIALS_PATH: &str = "/nano_user_details";

/// User name of the gateway account created by the image.
pub const GATEWAY_USER: &str = "nano";

/// Environment variable carrying the gateway port into the container.
pub const GATEWAY_PORT_ENV: &str = "RGW_CIVETWEB_PORT";

/// In-container mount point of the working directory.
pub const CONTAINER_DATA_DIR: &str = "/data";

/// Default host working directory bound into new clusters.
pub const DEFAULT_WORKING_DIR: &str = "/tmp";

/// Command printing the gateway log from inside the container.
pub const GATEWAY_LOG_COMMAND: [&str; 3] = ["sh", "-c", "cat /var/log/ceph/client.rgw.*.log"];

/// Command printing the cluster health summary from inside the container.
pub const HEALTH_COMMAND: [&str; 2] = ["ceph", "health"];

/// Image label carrying the release name.
pub const RELEASE_LABEL: &str = "RELEASE";

/// Digest scheme prefix carried by image IDs reported in container listings.
pub const DIGEST_SCHEME_PREFIX: &str = "sha256:";

/// Reported instead of image metadata when the image no longer exists.
pub const IMAGE_NOT_PRESENT: &str = "image is not present, did you remove it?";

/// Reported when the image carries no release label.
pub const UNKNOWN_RELEASE: &str = "unknown image release, are you running an official image?";

/// Registry endpoint listing the published image tags.
pub const REGISTRY_TAGS_URL: &str = "https://registry.hub.docker.com/v2/repositories/ceph/daemon/tags/";

/// Number of tags per registry result page.
pub const REGISTRY_PAGE_SIZE: u64 = 10;

/// Issue tracker operators are pointed to after a readiness failure.
pub const ISSUE_TRACKER_URL: &str = "https://github.com/ceph/cn";

/// Environment variable naming an optional configuration file.
pub const CONFIG_ENV: &str = "NANOCTL_CONFIG";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "nanoctl";
