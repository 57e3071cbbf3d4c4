use super::config::ConfigError;
use super::quantizer::CodebookError;
use crate::core::models::backbone::ShapeMismatch;
use crate::core::network::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error(transparent)]
    ShapeMismatch(#[from] ShapeMismatch),

    #[error("Model loading failed: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid codebook: {source}")]
    Codebook {
        #[from]
        source: CodebookError,
    },

    #[error("Model is incompatible with the encoder: {0}")]
    IncompatibleModel(String),
}
