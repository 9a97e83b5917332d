//! Pod admission handling
//!
//! Bridges the AdmissionReview envelope and the mutation engine:
//! 1. Checks the request is for a Pod and decodes it
//! 2. Lets Pods that have not opted in through unchanged
//! 3. Runs the engine and attaches the resulting JSON patch, if any
//!
//! Failures never produce a partial patch; they deny the admission with a
//! status code and message.

use injector_mutation::gate;
use injector_mutation::mutator::pod_name;
use injector_mutation::PodMutator;
use k8s_openapi::api::core::v1::Pod;
use kube::core::admission::{AdmissionRequest, AdmissionResponse};
use kube::core::DynamicObject;
use tracing::{debug, error, info, warn};

use crate::error::WebhookError;

/// Message returned for Pods that have not opted in
pub const NOT_MANAGED_MESSAGE: &str = "Pod is not managed by the CSI driver";

/// Resource kind the webhook accepts
const POD_KIND: &str = "Pod";

/// Admits Pods through the mutation engine
#[derive(Debug, Clone, Copy, Default)]
pub struct Admitter {
    mutator: PodMutator,
}

impl Admitter {
    /// Create an admitter backed by the given mutator
    pub fn new(mutator: PodMutator) -> Self {
        Self { mutator }
    }

    /// Extract the Pod from an admission request
    pub fn pod(request: &AdmissionRequest<DynamicObject>) -> Result<Pod, WebhookError> {
        if request.kind.kind != POD_KIND {
            return Err(WebhookError::NotAPod {
                kind: request.kind.kind.clone(),
            });
        }

        let object = request
            .object
            .as_ref()
            .ok_or_else(|| WebhookError::InvalidReview("request has no object".to_string()))?;

        let value = serde_json::to_value(object)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Produce the admission response for a Pod review
    pub fn mutate_pod_review(
        &self,
        request: &AdmissionRequest<DynamicObject>,
    ) -> AdmissionResponse {
        let uid = &request.uid;

        let pod = match Self::pod(request) {
            Ok(pod) => pod,
            Err(e) => {
                warn!(
                    uid = %uid,
                    kind = %request.kind.kind,
                    error = %e,
                    "rejecting admission request"
                );
                return deny(request, &e);
            }
        };

        if !gate::applies(&pod) {
            info!(
                uid = %uid,
                pod = pod_name(&pod),
                namespace = ?request.namespace,
                "Pod is not managed by the CSI driver, allowing unchanged"
            );
            let mut response = AdmissionResponse::from(request);
            response.result.message = NOT_MANAGED_MESSAGE.to_string();
            return response;
        }

        let patch = match self.mutator.mutate_patch(&pod) {
            Ok(patch) => patch,
            Err(e) => {
                error!(
                    uid = %uid,
                    pod = pod_name(&pod),
                    stage = e.stage(),
                    error = %e,
                    "Failed to mutate pod"
                );
                return deny(request, &WebhookError::Mutation(e));
            }
        };

        let Some(patch) = patch else {
            debug!(uid = %uid, pod = pod_name(&pod), "pod already converged, allowing unchanged");
            return AdmissionResponse::from(request);
        };

        info!(
            uid = %uid,
            pod = pod_name(&pod),
            namespace = ?request.namespace,
            patch_ops = patch.0.len(),
            "Applying patch to pod"
        );

        match AdmissionResponse::from(request).with_patch(patch) {
            Ok(response) => response,
            Err(e) => {
                error!(uid = %uid, error = %e, "Failed to serialize patch");
                deny(request, &WebhookError::PatchSerialization(e.to_string()))
            }
        }
    }
}

/// Deny the request, carrying the error's status code and message
fn deny(request: &AdmissionRequest<DynamicObject>, err: &WebhookError) -> AdmissionResponse {
    let mut response = AdmissionResponse::from(request).deny(err.to_string());
    response.result.code = err.status_code().as_u16();
    response
}
