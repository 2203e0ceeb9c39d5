use shared::error::BusinessError;
use thiserror::Error;

/// Failure of one gateway call. Transport and malformed-envelope failures
/// never carry a server message; business failures always do.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response envelope: {0}")]
    Malformed(String),
    #[error(transparent)]
    Business(#[from] BusinessError),
}

impl GatewayError {
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            GatewayError::Business(BusinessError::SessionExpired { .. })
        )
    }

    /// The human-readable message the backend attached, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Business(err) => Some(err.message()),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
