use std::net::AddrParseError;

use pcos_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("invalid listen address '{addr}': {source}")]
    Address {
        addr: String,
        #[source]
        source: AddrParseError,
    },
    #[error("invalid --set argument '{0}', expected NAME=VALUE")]
    Assignment(String),
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
