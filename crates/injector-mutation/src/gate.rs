//! Opt-in gate
//!
//! Pods that never opted in must pass through untouched, so the gate runs
//! before any clone is taken or reconciler invoked.

use k8s_openapi::api::core::v1::Pod;

use crate::constants::MANAGED_CSI_ANNOTATION;

/// Returns true iff the Pod's managed-csi annotation is exactly `"true"`
pub fn applies(pod: &Pod) -> bool {
    pod.metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(MANAGED_CSI_ANNOTATION))
        .is_some_and(|v| v == "true")
}
