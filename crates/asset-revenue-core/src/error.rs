use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevenueError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for RevenueError {
    fn from(e: serde_json::Error) -> Self {
        RevenueError::SerializationError(e.to_string())
    }
}
