use thiserror::Error;

/// Business-level failure reported inside a response envelope, independent
/// of transport status. The distinguished session-expired codes force a
/// logout at the call site; everything else is an ordinary rejection.
#[derive(Debug, Clone, Error)]
pub enum BusinessError {
    #[error("session expired ({code}): {message}")]
    SessionExpired { code: String, message: String },
    #[error("request rejected ({code}): {message}")]
    Rejected { code: String, message: String },
}

impl BusinessError {
    pub fn message(&self) -> &str {
        match self {
            BusinessError::SessionExpired { message, .. } => message,
            BusinessError::Rejected { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, Copy, Error)]
#[error("unknown gender code {0}")]
pub struct UnknownGender(pub u8);
