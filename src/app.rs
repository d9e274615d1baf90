//! Per-request orchestration: validate, compose, send, normalize.

use crate::api::{ApiReply, EditImageRequest};
use crate::compose::ComposePlan;
use crate::models::{Config, ImageVariation, VariationKind};
use crate::normalize::{classify_failure, normalize};
use crate::provider::{GenerationBackend, OpenRouterClient};
use crate::{Error, Result};
use tracing::info;

/// Runs one generation request end to end against a backend.
///
/// Each request is handled independently and synchronously: one outbound
/// call, awaited to completion, no retry, no fan-out. Any transient
/// upstream failure surfaces immediately as a classified error.
pub struct Studio {
    backend: Box<dyn GenerationBackend>,
}

impl Studio {
    pub fn new(config: &Config) -> Self {
        Self::with_backend(Box::new(OpenRouterClient::new(config)))
    }

    pub fn with_backend(backend: Box<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Validate, compose, send, and normalize one request, stamping each
    /// variation with the mode's kind for download naming.
    pub async fn generate(&self, request: &EditImageRequest) -> Result<Vec<ImageVariation>> {
        let plan = ComposePlan::from_request(request)?;
        let composed = plan.compose();

        info!(
            "Composed {:?} request ({} variations, image attached: {})",
            plan.mode(),
            composed.variation_count,
            composed.source_image.is_some()
        );

        let reply = self.backend.send(&composed).await?;
        let mut variations = normalize(&reply.body, reply.status)?;

        let kind = plan.mode().kind();
        for variation in &mut variations {
            variation.kind = Some(kind);
        }

        info!("Normalized {} variations", variations.len());
        Ok(variations)
    }

    /// Front-door contract: the raw upstream reply is passed through
    /// unnormalized on success, and failures are classified by status.
    pub async fn handle(&self, request: &EditImageRequest) -> ApiReply {
        match self.raw_reply(request).await {
            Ok(raw) => ApiReply::success(raw),
            Err(error) => ApiReply::from_error(&error),
        }
    }

    async fn raw_reply(&self, request: &EditImageRequest) -> Result<serde_json::Value> {
        let plan = ComposePlan::from_request(request)?;
        let composed = plan.compose();

        let reply = self.backend.send(&composed).await?;
        if !(200..300).contains(&reply.status) {
            return Err(Error::Upstream(classify_failure(reply.status, &reply.body)));
        }

        Ok(serde_json::from_str(&reply.body)?)
    }
}

/// Kind-driven download file name for one variation.
pub fn download_file_name(variation: &ImageVariation) -> String {
    match variation.kind {
        Some(VariationKind::Combined) => {
            format!("overlay-removed-product-{}.png", variation.index)
        }
        Some(VariationKind::TextOnly) => format!("text-only-{}.png", variation.index),
        Some(VariationKind::Edit) => format!("edited-image-{}.png", variation.index),
        _ => format!("generated-image-{}.png", variation.index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenerationMode;
    use crate::provider::MockGenerationClient;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn edit_request() -> EditImageRequest {
        EditImageRequest {
            mode: GenerationMode::Edit,
            image: Some("aW1hZ2U=".to_string()),
            prompt: Some("add warm lighting".to_string()),
            text_prompt: None,
            image_count: None,
        }
    }

    fn chat_body(count: usize) -> String {
        let images: Vec<_> = (0..count)
            .map(|i| json!({ "image_url": { "url": format!("data:image/png;base64,IMG{}", i) } }))
            .collect();
        json!({ "choices": [{ "message": { "images": images } }] }).to_string()
    }

    #[tokio::test]
    async fn test_generate_tags_variations_with_mode_kind() {
        let backend = MockGenerationClient::new().with_reply(200, &chat_body(3));
        let studio = Studio::with_backend(Box::new(backend));

        let variations = studio.generate(&edit_request()).await.unwrap();

        assert_eq!(variations.len(), 3);
        assert!(variations
            .iter()
            .all(|v| v.kind == Some(VariationKind::Edit)));
        let indexes: Vec<u32> = variations.iter().map(|v| v.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_backend_call() {
        let backend = MockGenerationClient::new();
        let probe = backend.clone();
        let studio = Studio::with_backend(Box::new(backend));

        let mut request = edit_request();
        request.image = None;

        let err = studio.generate(&request).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_classified() {
        let backend = MockGenerationClient::new().with_reply(429, "quota exceeded");
        let studio = Studio::with_backend(Box::new(backend));

        let err = studio.generate(&edit_request()).await.unwrap_err();
        match err {
            Error::Upstream(classified) => {
                assert_eq!(classified.http_status, 429);
                assert_eq!(classified.raw_details, "quota exceeded");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backend_sees_composed_text_not_raw_instruction() {
        let backend = MockGenerationClient::new();
        let probe = backend.clone();
        let studio = Studio::with_backend(Box::new(backend));

        studio.generate(&edit_request()).await.unwrap();

        let sent = probe.last_request().unwrap();
        assert!(sent.instruction_text.contains("\"add warm lighting\""));
        assert_ne!(sent.instruction_text, "add warm lighting");
    }

    #[tokio::test]
    async fn test_handle_passes_raw_reply_through() {
        let body = chat_body(2);
        let backend = MockGenerationClient::new().with_reply(200, &body);
        let studio = Studio::with_backend(Box::new(backend));

        let reply = studio.handle(&edit_request()).await;

        assert_eq!(reply.status(), 200);
        let serialized = serde_json::to_value(&reply).unwrap();
        let expected: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(serialized["response"], expected);
    }

    #[tokio::test]
    async fn test_handle_mirrors_upstream_failure_status() {
        let backend = MockGenerationClient::new().with_reply(401, "bad key");
        let studio = Studio::with_backend(Box::new(backend));

        let reply = studio.handle(&edit_request()).await;
        assert_eq!(reply.status(), 401);
    }

    #[test]
    fn test_download_file_names_follow_kind() {
        let mut variation = ImageVariation {
            data: "Zm9v".to_string(),
            mime_type: "image/png".to_string(),
            index: 2,
            kind: Some(VariationKind::Combined),
        };
        assert_eq!(download_file_name(&variation), "overlay-removed-product-2.png");

        variation.kind = Some(VariationKind::TextOnly);
        assert_eq!(download_file_name(&variation), "text-only-2.png");

        variation.kind = Some(VariationKind::Edit);
        assert_eq!(download_file_name(&variation), "edited-image-2.png");

        variation.kind = Some(VariationKind::Generate);
        assert_eq!(download_file_name(&variation), "generated-image-2.png");

        variation.kind = None;
        assert_eq!(download_file_name(&variation), "generated-image-2.png");
    }
}
