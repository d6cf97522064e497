use serde::Deserialize;
use thiserror::Error;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors raised by the session gateway while talking to the pricing backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The token endpoint rejected the credentials.
    #[error("auth failed ({status}): {body}")]
    Auth { status: u16, body: String },
    /// The pricing endpoint failed for a non-auth reason. The last known
    /// zone data stays valid; retrying is the caller's responsibility.
    #[error("pricing request failed ({status}): {message}")]
    Pricing { status: u16, message: String },
    /// The pricing endpoint returned 401. The cached token has already been
    /// dropped; the next call re-authenticates.
    #[error("unauthorized: {body}")]
    Unauthorized { body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized { .. })
    }
}

/// Structured error body the backend emits (`{"detail": ...}`).
#[derive(Debug, Deserialize)]
pub(crate) struct ServerDetail {
    pub(crate) detail: String,
}
