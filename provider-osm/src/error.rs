//! Error types for the OSM trace API provider

use thiserror::Error;

/// OSM trace API provider errors
#[derive(Error, Debug)]
pub enum OsmError {
    /// Authentication was rejected by the API
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an unexpected status
    #[error("OSM API error (status {status_code}): {url}")]
    ApiError { status_code: u16, url: String },

    /// Failed to parse an API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for OSM trace API operations
pub type Result<T> = std::result::Result<T, OsmError>;

impl From<OsmError> for bridge_traits::error::BridgeError {
    fn from(error: OsmError) -> Self {
        match error {
            OsmError::AuthenticationFailed(msg) => {
                bridge_traits::error::BridgeError::OperationFailed(format!(
                    "Authentication failed: {}",
                    msg
                ))
            }
            OsmError::ApiError { status_code, url } => {
                bridge_traits::error::BridgeError::OperationFailed(format!(
                    "API error (status {}): {}",
                    status_code, url
                ))
            }
            OsmError::ParseError(msg) => {
                bridge_traits::error::BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            OsmError::BridgeError(e) => e,
        }
    }
}
