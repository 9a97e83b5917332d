//! Error types for the webhook

use axum::http::StatusCode;
use injector_mutation::MutationError;

/// Error type for webhook operations
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The admission review request was invalid or malformed
    #[error("invalid admission review: {0}")]
    InvalidReview(String),

    /// The admission request is for something other than a Pod
    #[error("object in the request is not a Pod (got {kind:?})")]
    NotAPod {
        /// Kind named by the request
        kind: String,
    },

    /// The request object could not be decoded as a Pod
    #[error("failed to decode Pod: {0}")]
    Decode(#[from] serde_json::Error),

    /// The mutation engine failed
    #[error("failed to mutate the Pod: {0}")]
    Mutation(#[from] MutationError),

    /// The computed patch could not be attached to the response
    #[error("patch serialization error: {0}")]
    PatchSerialization(String),

    /// The server configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// The listener failed
    #[error("server error: {0}")]
    Server(String),
}

impl WebhookError {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidReview(_) | Self::NotAPod { .. } | Self::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Mutation(_) | Self::PatchSerialization(_) | Self::Config(_) | Self::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
