//! Pod mutation engine for SPIFFE CSI socket injection
//!
//! Given a Pod submitted for admission, the engine decides whether the Pod has
//! opted into workload-identity injection and, if so, converges a private
//! clone of it towards the canonical state:
//!
//! - exactly one `workload-socket` volume backed by the `csi.spiffe.io` driver
//! - a read-only mount of that volume at both canonical paths in every
//!   init and regular container
//! - exactly one `SPIFFE_ENDPOINT_SOCKET` environment variable per container
//!
//! The difference between the caller's Pod and the converged clone is then
//! emitted as a JSON patch.
//!
//! # Modules
//!
//! - [`constants`] - Wire-visible names shared with the CSI driver
//! - [`gate`] - Opt-in annotation check
//! - [`reconciler`] - Volume, mount and env reconciliation steps
//! - [`mutator`] - Pipeline orchestration over an owned clone
//! - [`patch`] - Structural diff between original and mutated Pods
//! - [`error`] - Error types for the engine

#![deny(missing_docs)]

pub mod constants;
pub mod error;
pub mod gate;
pub mod mutator;
pub mod patch;
pub mod reconciler;

pub use error::MutationError;
pub use mutator::PodMutator;

/// Result type alias using the engine's error type
pub type Result<T> = std::result::Result<T, MutationError>;
