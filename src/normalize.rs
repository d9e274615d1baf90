//! Response normalization: parses the heterogeneous reply shapes of the
//! upstream providers into uniform [`ImageVariation`] records, and
//! classifies non-success statuses into user-actionable errors.

use crate::models::{ClassifiedError, ImageVariation};
use crate::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Mime type assumed when the upstream omits one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

// Mime portion is deliberately loose; a malformed mime still strips.
static DATA_URI_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:[^;,]*;base64,").expect("valid regex"));

/// Normalize a raw upstream reply.
///
/// On a success status the body is matched against the known reply schemas;
/// a success reply with zero extractable variations is an anomaly reported
/// as [`Error::EmptyResult`], distinct from a transport failure. On a
/// non-success status the body is never parsed for variations; the failure
/// is classified by status code alone.
pub fn normalize(raw_body: &str, http_status: u16) -> Result<Vec<ImageVariation>> {
    if !(200..300).contains(&http_status) {
        return Err(Error::Upstream(classify_failure(http_status, raw_body)));
    }

    let value: serde_json::Value = match serde_json::from_str(raw_body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Provider reply is not valid JSON: {}", e);
            return Err(Error::EmptyResult);
        }
    };

    match KnownSchema::resolve(&value) {
        Some(schema) => Ok(schema.into_variations()),
        None => {
            tracing::warn!("Provider reply parsed but contained no image variations");
            Err(Error::EmptyResult)
        }
    }
}

/// Map a non-success HTTP status to a user-actionable message, independent
/// of any response body content. The body is retained verbatim as
/// diagnostics only.
pub fn classify_failure(http_status: u16, raw_details: &str) -> ClassifiedError {
    let user_message = match http_status {
        401 => "The API key is invalid. Generate a new key on OpenRouter.ai and update your configuration",
        402 => "Your account does not have enough purchased credit",
        429 => "The free-tier daily limit (50 requests/day) has been reached. Purchasing $10 of credit raises it to 1000 requests/day",
        _ => "API call failed",
    };

    ClassifiedError {
        http_status,
        user_message: user_message.to_string(),
        raw_details: raw_details.to_string(),
    }
}

/// Union of the reply shapes the two known upstream providers produce for
/// equivalent generation results.
///
/// Resolution tries each parser in fixed priority order and adopts the
/// first that yields at least one variation, so additional schemas can be
/// added without touching call sites.
#[derive(Debug)]
enum KnownSchema {
    ChatCompletions(ChatCompletionsReply),
    Candidates(CandidatesReply),
}

impl KnownSchema {
    fn resolve(value: &serde_json::Value) -> Option<Self> {
        if let Ok(reply) = serde_json::from_value::<ChatCompletionsReply>(value.clone()) {
            let schema = KnownSchema::ChatCompletions(reply);
            if schema.has_variations() {
                return Some(schema);
            }
        }

        if let Ok(reply) = serde_json::from_value::<CandidatesReply>(value.clone()) {
            let schema = KnownSchema::Candidates(reply);
            if schema.has_variations() {
                return Some(schema);
            }
        }

        None
    }

    fn has_variations(&self) -> bool {
        match self {
            KnownSchema::ChatCompletions(reply) => reply
                .choices
                .first()
                .map(|choice| {
                    choice
                        .message
                        .images
                        .iter()
                        .any(|record| record.image_url.is_some())
                })
                .unwrap_or(false),
            KnownSchema::Candidates(reply) => reply
                .candidates
                .first()
                .and_then(|candidate| candidate.content.as_ref())
                .map(|content| content.parts.iter().any(|part| part.inline_data.is_some()))
                .unwrap_or(false),
        }
    }

    /// Emit variations in discovery order, with 1-based contiguous indexes.
    fn into_variations(self) -> Vec<ImageVariation> {
        match self {
            KnownSchema::ChatCompletions(reply) => reply
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.images)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|record| record.image_url.map(|reference| reference.url))
                .enumerate()
                .map(|(position, url)| ImageVariation {
                    data: strip_data_uri_prefix(&url).to_string(),
                    mime_type: DEFAULT_MIME_TYPE.to_string(),
                    index: position as u32 + 1,
                    kind: None,
                })
                .collect(),
            KnownSchema::Candidates(reply) => reply
                .candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content)
                .map(|content| content.parts)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|part| part.inline_data)
                .enumerate()
                .map(|(position, inline)| ImageVariation {
                    data: inline.data,
                    mime_type: inline
                        .mime_type
                        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
                    index: position as u32 + 1,
                    kind: None,
                })
                .collect(),
        }
    }
}

fn strip_data_uri_prefix(url: &str) -> &str {
    match DATA_URI_PREFIX.find(url) {
        Some(found) => &url[found.end()..],
        None => url,
    }
}

/// "chat/completions style" reply: generated image records carrying
/// embedded data-URI strings.
#[derive(Debug, Deserialize)]
struct ChatCompletionsReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    images: Vec<ImageRecord>,
}

#[derive(Debug, Deserialize)]
struct ImageRecord {
    image_url: Option<ImageReference>,
}

#[derive(Debug, Deserialize)]
struct ImageReference {
    url: String,
}

/// "candidates style" reply: content parts optionally carrying inline
/// binary data with an explicit mime type.
#[derive(Debug, Deserialize)]
struct CandidatesReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    data: String,
    mime_type: Option<String>,
}
