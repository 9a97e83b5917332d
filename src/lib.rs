//! SPIFFE CSI injector - mutating admission webhook binary support
//!
//! The reconciliation engine lives in `injector-mutation` and the admission
//! transport in `injector-webhook`. This crate holds what the binary needs to
//! run them:
//!
//! - [`config`] - CLI and environment configuration
//! - [`telemetry`] - Log subscriber setup

#![deny(missing_docs)]

pub mod config;
pub mod telemetry;

/// Default port for the HTTPS listener
pub const DEFAULT_TLS_PORT: u16 = 8443;

/// Default port for the plain HTTP listener
pub const DEFAULT_HTTP_PORT: u16 = 8080;
