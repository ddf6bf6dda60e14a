use thiserror::Error;

#[derive(Debug, Error)]
pub enum FundModelError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for FundModelError {
    fn from(e: serde_json::Error) -> Self {
        FundModelError::SerializationError(e.to_string())
    }
}
