//! Error types for the mutation engine

use thiserror::Error;

/// Failure of one mutation pipeline run
///
/// A Pod that does not opt in is not an error; the gate reports that as a
/// plain `false`. Every variant here aborts the pipeline and names the stage
/// that failed so the transport can log it and deny the admission.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MutationError {
    /// A reconciler could not bring the Pod to its target state
    #[error("{stage} reconciler failed: {reason}")]
    Reconcile {
        /// Name of the reconciler that failed
        stage: &'static str,
        /// Why the Pod could not be converged
        reason: String,
    },

    /// The original or mutated Pod could not be serialized for diffing
    #[error("failed to compute pod patch: {0}")]
    Diff(#[from] serde_json::Error),
}

impl MutationError {
    /// Create a reconcile error for the given stage
    pub fn reconcile(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::Reconcile {
            stage,
            reason: reason.into(),
        }
    }

    /// Pipeline stage that produced this error
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Reconcile { stage, .. } => *stage,
            Self::Diff(_) => "patch",
        }
    }
}
