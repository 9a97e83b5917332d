//! AdmissionReview transport for the SPIFFE CSI injector
//!
//! Wraps the [`injector_mutation`] engine in a mutating admission webhook:
//!
//! - [`admission`] - Turns admission requests into Pods and engine results
//!   into admission responses
//! - [`router`] - `POST /mutate` and `GET /healthz`
//! - [`server`] - Plain HTTP or rustls-backed HTTPS listener
//! - [`error`] - Error types and their HTTP status mapping

#![deny(missing_docs)]

pub mod admission;
pub mod error;
pub mod router;
pub mod server;

pub use admission::Admitter;
pub use error::WebhookError;
pub use router::webhook_router;
pub use server::{serve, ServerConfig, TlsConfig};
