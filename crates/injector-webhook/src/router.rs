//! HTTP routes for the webhook
//!
//! - `POST /mutate` - AdmissionReview for Pods
//! - `GET /healthz` - liveness probe

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use kube::core::DynamicObject;
use tracing::{debug, error};

use crate::admission::Admitter;

/// Build the webhook router with a shared [`Admitter`]
pub fn webhook_router(admitter: Arc<Admitter>) -> Router {
    Router::new()
        .route("/mutate", post(mutate_handler))
        .route("/healthz", get(healthz))
        .with_state(admitter)
}

/// Handle a mutating admission review for a Pod
pub async fn mutate_handler(
    State(admitter): State<Arc<Admitter>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let req: AdmissionRequest<DynamicObject> = match body.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to parse admission request");
            return Json(AdmissionResponse::invalid(e.to_string()).into_review());
        }
    };

    debug!(uid = %req.uid, operation = ?req.operation, "received mutation request");
    Json(admitter.mutate_pod_review(&req).into_review())
}

async fn healthz() -> &'static str {
    debug!("received health check request");
    "ok"
}
