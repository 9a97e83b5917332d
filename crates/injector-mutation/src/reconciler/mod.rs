//! Reconciliation steps
//!
//! Each reconciler inspects one concern of a Pod (volumes, mounts, env) and
//! converges it towards the canonical state in place. Reconcilers are
//! idempotent: running one against its own output changes nothing.
//!
//! The set of steps is closed. [`Reconciler`] enumerates them and
//! [`PIPELINE`] fixes the order the mutator runs them in: the volume must be
//! declared before mounts reference it by name, and env injection comes last.

mod env;
mod mount;
mod volume;

pub use env::EnvReconciler;
pub use mount::MountReconciler;
pub use volume::{VolumeAction, VolumeReconciler};

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};

use crate::error::MutationError;

/// Common capability of every reconciliation step
pub trait Reconcile {
    /// Stage name used in logs and errors
    fn name(&self) -> &'static str;

    /// Converge the Pod in place
    fn reconcile(&self, pod: &mut Pod) -> Result<(), MutationError>;
}

/// One step of the mutation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciler {
    /// Ensure the `workload-socket` CSI volume exists exactly once
    Volume(VolumeReconciler),
    /// Ensure every container mounts the socket volume at both paths
    Mount(MountReconciler),
    /// Ensure every container carries the socket endpoint variable
    Env(EnvReconciler),
}

/// Reconcilers in the order they must run
pub const PIPELINE: [Reconciler; 3] = [
    Reconciler::Volume(VolumeReconciler),
    Reconciler::Mount(MountReconciler),
    Reconciler::Env(EnvReconciler),
];

impl Reconcile for Reconciler {
    fn name(&self) -> &'static str {
        match self {
            Self::Volume(r) => r.name(),
            Self::Mount(r) => r.name(),
            Self::Env(r) => r.name(),
        }
    }

    fn reconcile(&self, pod: &mut Pod) -> Result<(), MutationError> {
        match self {
            Self::Volume(r) => r.reconcile(pod),
            Self::Mount(r) => r.reconcile(pod),
            Self::Env(r) => r.reconcile(pod),
        }
    }
}

/// Borrow the Pod spec, failing the stage if the Pod has none
///
/// Admission only ever sees Pods with a spec, but a Pod without one cannot be
/// converged and must not be reported as mutated.
fn pod_spec_mut<'a>(
    pod: &'a mut Pod,
    stage: &'static str,
) -> Result<&'a mut PodSpec, MutationError> {
    pod.spec
        .as_mut()
        .ok_or_else(|| MutationError::reconcile(stage, "pod has no spec"))
}

/// Init containers followed by regular containers
fn all_containers_mut(spec: &mut PodSpec) -> impl Iterator<Item = &mut Container> {
    spec.init_containers
        .iter_mut()
        .flatten()
        .chain(spec.containers.iter_mut())
}
