//! Canonical names shared with the SPIFFE CSI driver
//!
//! These values are wire-visible: the driver, the workloads and the webhook
//! configuration all depend on them matching exactly.

/// Name of the injected volume and of every mount that references it
pub const WORKLOAD_SOCKET: &str = "workload-socket";

/// CSI driver that backs the injected volume
pub const CSI_DRIVER: &str = "csi.spiffe.io";

/// Primary mount path for the workload API socket directory
pub const SOCKET_MOUNT_PATH: &str = "/var/run/secrets/workload-spiffe-uds";

/// Secondary mount path, kept for images that resolve `/run` without `/var`
pub const SOCKET_MOUNT_PATH_ALT: &str = "/run/secrets/workload-spiffe-uds";

/// Both canonical mount paths, in the order mounts are appended
pub const SOCKET_MOUNT_PATHS: [&str; 2] = [SOCKET_MOUNT_PATH, SOCKET_MOUNT_PATH_ALT];

/// Environment variable that points workloads at the socket
pub const SOCKET_ENV_VAR: &str = "SPIFFE_ENDPOINT_SOCKET";

/// Annotation a Pod sets to `"true"` to opt into injection
pub const MANAGED_CSI_ANNOTATION: &str = "omegahome.net/managed-csi";

/// Value of [`SOCKET_ENV_VAR`]: a unix URI for the socket under the primary path
pub fn socket_endpoint() -> String {
    format!("unix://{}/socket", SOCKET_MOUNT_PATH)
}
