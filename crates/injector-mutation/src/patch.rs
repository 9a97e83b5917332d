//! Structural diff between the original and mutated Pod
//!
//! Both Pods are lowered to `serde_json::Value` before diffing so that only
//! their contents are compared; the result is an RFC 6902 JSON patch that
//! turns the original into the mutated Pod when applied in order.

use json_patch::Patch;
use k8s_openapi::api::core::v1::Pod;

use crate::error::MutationError;

/// Compute the JSON patch from `original` to `mutated`
pub fn diff(original: &Pod, mutated: &Pod) -> Result<Patch, MutationError> {
    let before = serde_json::to_value(original)?;
    let after = serde_json::to_value(mutated)?;
    Ok(json_patch::diff(&before, &after))
}
