//! Errors from loading or storing a layout.

/// Failure of a [`crate::LayoutGateway`] call.
///
/// A missing layout is not an error: gateways return the empty version-1
/// layout instead. Callers keep their in-memory state on every variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// No valid session. Distinct from "no layout saved yet".
    #[error("Not signed in")]
    Unauthenticated,

    /// The request never completed (network, storage). Safe to retry.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response or stored data could not be decoded.
    #[error("Malformed layout data: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(_) => true,
            GatewayError::Server { status, .. } => *status >= 500,
            GatewayError::Unauthenticated | GatewayError::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Malformed(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
