//! Socket endpoint environment reconciliation

use k8s_openapi::api::core::v1::{Container, EnvVar, Pod};
use tracing::debug;

use super::{all_containers_mut, pod_spec_mut, Reconcile};
use crate::constants::{socket_endpoint, SOCKET_ENV_VAR};
use crate::error::MutationError;

/// Ensures every container carries exactly one `SPIFFE_ENDPOINT_SOCKET`
/// pointing at the canonical socket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvReconciler;

impl EnvReconciler {
    /// Upsert the endpoint variable. An existing entry is updated in place
    /// and never followed by an append.
    fn reconcile_container(&self, container: &mut Container, endpoint: &str) {
        let env = container.env.get_or_insert_with(Vec::new);

        match env.iter_mut().find(|var| var.name == SOCKET_ENV_VAR) {
            Some(var) if var.value.as_deref() == Some(endpoint) && var.value_from.is_none() => {}
            Some(var) => {
                debug!(
                    stage = self.name(),
                    container = %container.name,
                    previous = ?var.value,
                    "overwriting socket endpoint"
                );
                // value and valueFrom are mutually exclusive
                var.value = Some(endpoint.to_string());
                var.value_from = None;
            }
            None => {
                debug!(
                    stage = self.name(),
                    container = %container.name,
                    "injecting socket endpoint"
                );
                env.push(EnvVar {
                    name: SOCKET_ENV_VAR.to_string(),
                    value: Some(endpoint.to_string()),
                    ..Default::default()
                });
            }
        }
    }
}

impl Reconcile for EnvReconciler {
    fn name(&self) -> &'static str {
        "env"
    }

    fn reconcile(&self, pod: &mut Pod) -> Result<(), MutationError> {
        let endpoint = socket_endpoint();
        let spec = pod_spec_mut(pod, self.name())?;
        for container in all_containers_mut(spec) {
            self.reconcile_container(container, &endpoint);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::fixtures::*;
    use k8s_openapi::api::core::v1::{EnvVarSource, ObjectFieldSelector};

    const ENDPOINT: &str = "unix:///var/run/secrets/workload-spiffe-uds/socket";

    fn reconciled(container: Container) -> Vec<EnvVar> {
        let mut pod = pod(vec![container]);
        EnvReconciler.reconcile(&mut pod).unwrap();
        pod.spec.unwrap().containers.remove(0).env.unwrap_or_default()
    }

    fn endpoint_var() -> EnvVar {
        env(SOCKET_ENV_VAR, ENDPOINT)
    }

    fn socket_vars(env: &[EnvVar]) -> Vec<&EnvVar> {
        env.iter().filter(|v| v.name == SOCKET_ENV_VAR).collect()
    }

    #[test]
    fn appends_endpoint_to_bare_container() {
        let env = reconciled(container("app"));
        assert_eq!(env, vec![endpoint_var()]);
    }

    #[test]
    fn appends_after_existing_variables() {
        let mut c = container("app");
        c.env = Some(vec![env("RUST_LOG", "info")]);

        let result = reconciled(c);
        assert_eq!(result, vec![env("RUST_LOG", "info"), endpoint_var()]);
    }

    #[test]
    fn overwrites_stale_value_in_place() {
        let mut c = container("app");
        c.env = Some(vec![
            env(SOCKET_ENV_VAR, "unix:///tmp/agent.sock"),
            env("RUST_LOG", "info"),
        ]);

        let result = reconciled(c);
        assert_eq!(result, vec![endpoint_var(), env("RUST_LOG", "info")]);
    }

    #[test]
    fn never_appends_after_updating_existing_entry() {
        let mut c = container("app");
        c.env = Some(vec![env(SOCKET_ENV_VAR, "unix:///tmp/agent.sock")]);

        let result = reconciled(c);
        assert_eq!(socket_vars(&result).len(), 1);
    }

    #[test]
    fn correct_entry_is_left_untouched() {
        let mut c = container("app");
        c.env = Some(vec![env("A", "1"), endpoint_var(), env("B", "2")]);
        let before = c.env.clone().unwrap();

        assert_eq!(reconciled(c), before);
    }

    #[test]
    fn value_from_is_replaced_by_literal_value() {
        let mut c = container("app");
        c.env = Some(vec![EnvVar {
            name: SOCKET_ENV_VAR.to_string(),
            value: None,
            value_from: Some(EnvVarSource {
                field_ref: Some(ObjectFieldSelector {
                    field_path: "metadata.annotations['socket']".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        assert_eq!(reconciled(c), vec![endpoint_var()]);
    }

    #[test]
    fn every_container_gets_exactly_one_endpoint() {
        let mut sidecar = container("sidecar");
        sidecar.env = Some(vec![env(SOCKET_ENV_VAR, "stale")]);
        let mut pod = pod(vec![container("app"), sidecar]);
        pod.spec.as_mut().unwrap().init_containers = Some(vec![container("setup")]);

        EnvReconciler.reconcile(&mut pod).unwrap();

        let spec = pod.spec.unwrap();
        for c in spec.init_containers.unwrap().iter().chain(&spec.containers) {
            let env = c.env.as_deref().unwrap_or_default();
            let vars = socket_vars(env);
            assert_eq!(vars.len(), 1, "container {}", c.name);
            assert_eq!(vars[0].value.as_deref(), Some(ENDPOINT));
        }
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut c = container("app");
        c.env = Some(vec![env(SOCKET_ENV_VAR, "stale")]);
        let mut pod = pod(vec![c]);

        EnvReconciler.reconcile(&mut pod).unwrap();
        let once = pod.clone();
        EnvReconciler.reconcile(&mut pod).unwrap();
        assert_eq!(pod, once);
    }
}
