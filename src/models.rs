//! Data models and structures
//!
//! Defines the generation modes, composed request payload, normalized
//! variation records, and classified upstream errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Model requested from OpenRouter when none is configured.
pub const DEFAULT_IMAGE_MODEL: &str = "google/gemini-2.5-flash-image-preview";

/// Caller-selected behavior tag. Determines which inputs are required and
/// how the outbound instruction text is synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    Edit,
    Generate,
    TextOnly,
    Combined,
}

impl GenerationMode {
    /// The kind stamped onto variations produced under this mode. Used only
    /// for output file naming.
    pub fn kind(self) -> VariationKind {
        match self {
            GenerationMode::Edit => VariationKind::Edit,
            GenerationMode::Generate => VariationKind::Generate,
            GenerationMode::TextOnly => VariationKind::TextOnly,
            GenerationMode::Combined => VariationKind::Combined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariationKind {
    Edit,
    Generate,
    TextOnly,
    Combined,
}

/// The composed outbound generation payload.
///
/// `source_image` presence is exactly determined by mode: edit, text-only,
/// and combined carry one attached image; generate is text-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub instruction_text: String,
    /// Base64-encoded source image, without any data-URI prefix.
    pub source_image: Option<String>,
    /// Requested variation count, 1 to 3.
    pub variation_count: u8,
}

/// One normalized generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariation {
    /// Base64 image payload.
    pub data: String,
    pub mime_type: String,
    /// 1-based, contiguous, in discovery order within one reply.
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<VariationKind>,
}

/// A non-success upstream reply classified by HTTP status.
///
/// `raw_details` holds the opaque upstream body for diagnostics; it is never
/// the primary user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub http_status: u16,
    pub user_message: String,
    pub raw_details: String,
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.user_message, self.http_status)
    }
}

/// Process-wide configuration, read once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub image_model: String,
    pub site_url: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            api_key: std::env::var("OPENROUTER_API_KEY")
                .map_err(|_| crate::Error::MissingCredential)?,
            base_url: std::env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api".to_string()),
            image_model: std::env::var("OPENROUTER_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serialization_tags() {
        let json = serde_json::to_string(&GenerationMode::TextOnly).unwrap();
        assert_eq!(json, "\"text-only\"");

        let mode: GenerationMode = serde_json::from_str("\"combined\"").unwrap();
        assert_eq!(mode, GenerationMode::Combined);
    }

    #[test]
    fn test_mode_rejects_unknown_tag() {
        let result = serde_json::from_str::<GenerationMode>("\"restyle\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_maps_to_kind() {
        assert_eq!(GenerationMode::Edit.kind(), VariationKind::Edit);
        assert_eq!(GenerationMode::TextOnly.kind(), VariationKind::TextOnly);
        assert_eq!(GenerationMode::Combined.kind(), VariationKind::Combined);
        assert_eq!(GenerationMode::Generate.kind(), VariationKind::Generate);
    }

    #[test]
    fn test_variation_omits_absent_kind() {
        let variation = ImageVariation {
            data: "Zm9v".to_string(),
            mime_type: "image/png".to_string(),
            index: 1,
            kind: None,
        };

        let json = serde_json::to_string(&variation).unwrap();
        assert!(!json.contains("kind"));
    }

    #[test]
    fn test_classified_error_display_leads_with_user_message() {
        let error = ClassifiedError {
            http_status: 429,
            user_message: "Quota exhausted".to_string(),
            raw_details: "{\"error\":\"rate limited\"}".to_string(),
        };

        let rendered = error.to_string();
        assert!(rendered.starts_with("Quota exhausted"));
        assert!(!rendered.contains("rate limited"));
    }
}
