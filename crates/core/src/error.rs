use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    /// Input bundle could not be decoded (wrong JSON type, unparsable timestamp, ...).
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Input decoded but carries values outside their domain.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Other(String),
}

impl VigilError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        VigilError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VigilError>;
