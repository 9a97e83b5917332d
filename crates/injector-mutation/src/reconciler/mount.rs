//! Socket mount reconciliation
//!
//! Mount injection is additive: a mount is appended for each canonical path a
//! container lacks, and nothing already present is rewritten or removed.

use k8s_openapi::api::core::v1::{Container, Pod, VolumeMount};
use tracing::debug;

use super::{all_containers_mut, pod_spec_mut, Reconcile};
use crate::constants::{SOCKET_MOUNT_PATHS, WORKLOAD_SOCKET};
use crate::error::MutationError;

/// Read-only mount of the socket volume at `path`
pub fn socket_mount(path: &str) -> VolumeMount {
    VolumeMount {
        name: WORKLOAD_SOCKET.to_string(),
        mount_path: path.to_string(),
        read_only: Some(true),
        ..Default::default()
    }
}

/// Ensures every init and regular container mounts the socket volume at
/// both canonical paths
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountReconciler;

impl MountReconciler {
    fn reconcile_container(&self, container: &mut Container) {
        let mut present = [false; SOCKET_MOUNT_PATHS.len()];
        for mount in container.volume_mounts.iter().flatten() {
            if mount.name != WORKLOAD_SOCKET {
                continue;
            }
            for (found, path) in present.iter_mut().zip(SOCKET_MOUNT_PATHS) {
                *found |= mount.mount_path == path;
            }
        }

        for (found, path) in present.into_iter().zip(SOCKET_MOUNT_PATHS) {
            if found {
                continue;
            }
            debug!(
                stage = self.name(),
                container = %container.name,
                path,
                "injecting socket mount"
            );
            container
                .volume_mounts
                .get_or_insert_with(Vec::new)
                .push(socket_mount(path));
        }
    }
}

impl Reconcile for MountReconciler {
    fn name(&self) -> &'static str {
        "mount"
    }

    fn reconcile(&self, pod: &mut Pod) -> Result<(), MutationError> {
        let spec = pod_spec_mut(pod, self.name())?;
        for container in all_containers_mut(spec) {
            self.reconcile_container(container);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SOCKET_MOUNT_PATH, SOCKET_MOUNT_PATH_ALT};
    use crate::reconciler::fixtures::*;

    fn mounts(container: &Container) -> Vec<VolumeMount> {
        container.volume_mounts.clone().unwrap_or_default()
    }

    fn reconciled(container: Container) -> Container {
        let mut pod = pod(vec![container]);
        MountReconciler.reconcile(&mut pod).unwrap();
        pod.spec.unwrap().containers.remove(0)
    }

    #[test]
    fn adds_both_mounts_to_bare_container() {
        let result = reconciled(container("app"));
        assert_eq!(
            mounts(&result),
            vec![
                socket_mount(SOCKET_MOUNT_PATH),
                socket_mount(SOCKET_MOUNT_PATH_ALT)
            ]
        );
    }

    #[test]
    fn adds_only_the_missing_path() {
        let mut c = container("app");
        c.volume_mounts = Some(vec![socket_mount(SOCKET_MOUNT_PATH_ALT)]);

        let result = reconciled(c);
        assert_eq!(
            mounts(&result),
            vec![
                socket_mount(SOCKET_MOUNT_PATH_ALT),
                socket_mount(SOCKET_MOUNT_PATH)
            ]
        );
    }

    #[test]
    fn preserves_unrelated_mounts() {
        let mut c = container("app");
        c.volume_mounts = Some(vec![mount("cache", "/cache", false)]);

        let result = reconciled(c);
        let all = mounts(&result);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], mount("cache", "/cache", false));
    }

    #[test]
    fn path_match_requires_socket_volume_name() {
        // Another volume mounted at the canonical path does not count
        let mut c = container("app");
        c.volume_mounts = Some(vec![mount("other", SOCKET_MOUNT_PATH, true)]);

        let result = reconciled(c);
        let socket_mounts: Vec<_> = mounts(&result)
            .into_iter()
            .filter(|m| m.name == WORKLOAD_SOCKET)
            .collect();
        assert_eq!(socket_mounts.len(), 2);
    }

    #[test]
    fn existing_canonical_mount_is_not_rewritten() {
        let mut c = container("app");
        c.volume_mounts = Some(vec![
            mount(WORKLOAD_SOCKET, SOCKET_MOUNT_PATH, false),
            socket_mount(SOCKET_MOUNT_PATH_ALT),
        ]);
        let before = mounts(&c);

        let result = reconciled(c);
        assert_eq!(mounts(&result), before);
    }

    #[test]
    fn init_and_regular_containers_get_identical_mounts() {
        let mut pod = pod(vec![container("app"), container("sidecar")]);
        pod.spec.as_mut().unwrap().init_containers = Some(vec![container("setup")]);

        MountReconciler.reconcile(&mut pod).unwrap();

        let spec = pod.spec.unwrap();
        let expected = vec![
            socket_mount(SOCKET_MOUNT_PATH),
            socket_mount(SOCKET_MOUNT_PATH_ALT),
        ];
        for c in spec.init_containers.unwrap().iter().chain(&spec.containers) {
            assert_eq!(mounts(c), expected, "container {}", c.name);
        }
    }

    #[test]
    fn missing_init_containers_stay_missing() {
        let mut pod = pod(vec![container("app")]);
        MountReconciler.reconcile(&mut pod).unwrap();
        assert!(pod.spec.unwrap().init_containers.is_none());
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut pod = pod(vec![container("app")]);
        pod.spec.as_mut().unwrap().init_containers = Some(vec![container("setup")]);

        MountReconciler.reconcile(&mut pod).unwrap();
        let once = pod.clone();
        MountReconciler.reconcile(&mut pod).unwrap();
        assert_eq!(pod, once);
    }
}
