//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use crate::models::ClassifiedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("OpenRouter API key is not configured")]
    MissingCredential,

    #[error("{0}")]
    Upstream(ClassifiedError),

    #[error("The provider returned a success status with no image variations")]
    EmptyResult,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
