use thiserror::Error;

#[derive(Debug, Error)]
pub enum FundWaterfallError {
    #[error("Invalid parameters: {field}: {reason}")]
    InvalidParameters { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FundWaterfallError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FundWaterfallError::InvalidParameters {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FundWaterfallError {
    fn from(e: serde_json::Error) -> Self {
        FundWaterfallError::SerializationError(e.to_string())
    }
}
