//! Mutation pipeline orchestration
//!
//! The mutator never touches the caller's Pod. When the gate admits a Pod it
//! takes one owned clone, runs every reconciler in [`PIPELINE`] order over
//! that clone, and hands back the converged result. The clone lives only as
//! long as the caller keeps it; nothing is retained between requests.

use std::borrow::Cow;

use json_patch::Patch;
use k8s_openapi::api::core::v1::Pod;
use tracing::{debug, info};

use crate::error::MutationError;
use crate::gate;
use crate::patch;
use crate::reconciler::{Reconcile, PIPELINE};

/// Display name for a Pod: its name, else its `generateName` prefix
pub fn pod_name(pod: &Pod) -> &str {
    pod.metadata
        .name
        .as_deref()
        .or(pod.metadata.generate_name.as_deref())
        .unwrap_or_default()
}

/// Runs the gate and the reconciliation pipeline for one Pod
#[derive(Debug, Clone, Copy, Default)]
pub struct PodMutator;

impl PodMutator {
    /// Create a new mutator
    pub fn new() -> Self {
        Self
    }

    /// Mutate a Pod
    ///
    /// Returns the Pod borrowed and untouched when it has not opted in,
    /// otherwise an owned, converged clone. A reconciler failure aborts the
    /// pipeline; no partially mutated Pod is ever returned.
    pub fn mutate<'a>(&self, pod: &'a Pod) -> Result<Cow<'a, Pod>, MutationError> {
        if !gate::applies(pod) {
            debug!(pod = pod_name(pod), "pod has not opted in, skipping mutation");
            return Ok(Cow::Borrowed(pod));
        }
        self.converge(pod.clone()).map(Cow::Owned)
    }

    /// Run every reconciler over an owned Pod without consulting the gate
    pub fn converge(&self, mut pod: Pod) -> Result<Pod, MutationError> {
        info!(
            pod = pod_name(&pod),
            namespace = ?pod.metadata.namespace,
            "reconciling pod"
        );
        for step in PIPELINE {
            step.reconcile(&mut pod)?;
            debug!(pod = pod_name(&pod), stage = step.name(), "stage converged");
        }
        Ok(pod)
    }

    /// Mutate a Pod and encode the changes as a JSON patch
    ///
    /// Returns `None` when the Pod has not opted in or is already converged.
    pub fn mutate_patch(&self, pod: &Pod) -> Result<Option<Patch>, MutationError> {
        let mutated = match self.mutate(pod)? {
            Cow::Borrowed(_) => return Ok(None),
            Cow::Owned(mutated) => mutated,
        };

        let patch = patch::diff(pod, &mutated)?;
        if patch.0.is_empty() {
            debug!(pod = pod_name(pod), "pod already converged");
            return Ok(None);
        }

        info!(
            pod = pod_name(pod),
            patch_ops = patch.0.len(),
            "computed pod patch"
        );
        Ok(Some(patch))
    }
}
