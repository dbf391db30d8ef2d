use openseals_core::{ProofError, SchemaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to parse document: {0}")]
    Parse(String),

    #[error("document is missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Proof(#[from] ProofError),
}

impl From<serde_yaml::Error> for LoaderError {
    fn from(e: serde_yaml::Error) -> Self {
        LoaderError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(e: serde_json::Error) -> Self {
        LoaderError::Parse(e.to_string())
    }
}
