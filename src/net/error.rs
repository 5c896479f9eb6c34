//! Error types for remote calls.

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request could not be built: {0}")]
    InvalidRequest(String),
}

/// Failure surfaced by the request pipeline.
///
/// `Status` carries the server's answer untouched, including the final 401
/// when recovery was not possible.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("request body could not be encoded: {0}")]
    Encode(String),
    #[error("response decode failed: {0}")]
    Decode(String),
    #[error("server returned an incomplete credential pair")]
    InvalidCredentials,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
