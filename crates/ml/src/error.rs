use std::time::Duration;

use memo_core::PolicyError;
use thiserror::Error;

/// Failures of a single call to the classification service.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("response carried no message content")]
    EmptyResponse,
}

impl ModelError {
    /// Transient failures get the single retry; everything else falls back at once.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::RateLimited { .. } => true,
            ModelError::Api { status, .. } => *status >= 500 || *status == 408,
            ModelError::Network(_) => true,
            ModelError::Timeout(_) => true,
            ModelError::EmptyResponse => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("model classifier not configured")]
    NotConfigured,

    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}
