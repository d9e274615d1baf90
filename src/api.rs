//! Front-door boundary payloads
//!
//! Models the JSON shapes exchanged with the UI layer. The HTTP server
//! itself lives outside this crate; embedders deserialize the inbound body
//! into [`EditImageRequest`] and serialize an [`ApiReply`] back.

use crate::models::GenerationMode;
use crate::Error;
use serde::{Deserialize, Serialize};

/// Inbound generation request as sent by the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditImageRequest {
    pub mode: GenerationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u8>,
}

/// Outbound reply at the front-door boundary.
///
/// On success the upstream reply is passed through unnormalized;
/// normalization is a caller-side concern. On failure the HTTP status
/// mirrors the upstream status, with 500 for local failures.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiReply {
    Success {
        success: bool,
        response: serde_json::Value,
    },
    Failure {
        error: String,
        status: u16,
        details: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        solution: Option<String>,
    },
}

impl ApiReply {
    pub fn success(response: serde_json::Value) -> Self {
        ApiReply::Success {
            success: true,
            response,
        }
    }

    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Upstream(classified) => ApiReply::Failure {
                error: classified.user_message.clone(),
                status: classified.http_status,
                details: classified.raw_details.clone(),
                solution: None,
            },
            Error::MissingCredential => ApiReply::Failure {
                error: error.to_string(),
                status: 500,
                details: String::new(),
                solution: Some(
                    "Set OPENROUTER_API_KEY in your .env file and restart the server".to_string(),
                ),
            },
            Error::InvalidInput(message) => ApiReply::Failure {
                error: message.clone(),
                status: 500,
                details: String::new(),
                solution: None,
            },
            Error::EmptyResult => ApiReply::Failure {
                error: error.to_string(),
                status: 500,
                details: String::new(),
                solution: None,
            },
            other => ApiReply::Failure {
                error: "Server error".to_string(),
                status: 500,
                details: other.to_string(),
                solution: None,
            },
        }
    }

    /// HTTP status the front door should answer with.
    pub fn status(&self) -> u16 {
        match self {
            ApiReply::Success { .. } => 200,
            ApiReply::Failure { status, .. } => *status,
        }
    }
}
