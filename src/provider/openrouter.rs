use super::{GenerationBackend, RawReply};
use crate::models::{Config, GenerationRequest};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const APP_TITLE: &str = "Promo Image Studio";

#[derive(Debug, Serialize)]
struct ChatCompletionBody {
    model: String,
    modalities: Vec<String>,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// OpenRouter chat/completions transport for image generation.
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    site_url: String,
    timeout: Duration,
}

impl OpenRouterClient {
    pub fn new(config: &Config) -> Self {
        Self::new_with_client(config, Client::new())
    }

    pub fn new_with_client(config: &Config, client: Client) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.image_model.clone(),
            base_url: config.base_url.clone(),
            site_url: config.site_url.clone(),
            timeout: Duration::from_secs(120),
        }
    }

    fn body_for(&self, request: &GenerationRequest) -> ChatCompletionBody {
        let mut content = vec![ContentPart::Text {
            text: request.instruction_text.clone(),
        }];

        if let Some(image) = &request.source_image {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:image/jpeg;base64,{}", image),
                },
            });
        }

        ChatCompletionBody {
            model: self.model.clone(),
            modalities: vec!["image".to_string(), "text".to_string()],
            temperature: 0.7,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenRouterClient {
    async fn send(&self, request: &GenerationRequest) -> Result<RawReply> {
        tracing::debug!(
            "Sending generation request to OpenRouter ({} variations, image attached: {})",
            request.variation_count,
            request.source_image.is_some()
        );

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", APP_TITLE)
            .json(&self.body_for(request))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to OpenRouter: {}", e);
                e
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::error!("OpenRouter API error (status {}): {}", status, body);
        }

        Ok(RawReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> OpenRouterClient {
        let config = Config {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            image_model: "google/gemini-2.5-flash-image-preview".to_string(),
            site_url: "http://localhost:3000".to_string(),
        };
        OpenRouterClient::new(&config)
    }

    fn edit_request() -> GenerationRequest {
        GenerationRequest {
            instruction_text: "Edit this image".to_string(),
            source_image: Some("aW1hZ2U=".to_string()),
            variation_count: 3,
        }
    }

    #[tokio::test]
    async fn test_send_posts_bearer_and_attribution_headers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("HTTP-Referer", "http://localhost:3000"))
            .and(header("X-Title", APP_TITLE))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"choices\":[]}"))
            .expect(1)
            .mount(&server)
            .await;

        let reply = make_client(&server).send(&edit_request()).await.unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, "{\"choices\":[]}");
    }

    #[tokio::test]
    async fn test_send_embeds_image_as_data_uri() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("data:image/jpeg;base64,aW1hZ2U="))
            .and(body_string_contains("\"modalities\":[\"image\",\"text\"]"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server).send(&edit_request()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_without_image_carries_text_only() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let request = GenerationRequest {
            instruction_text: "Generate 3 images".to_string(),
            source_image: None,
            variation_count: 3,
        };

        let client = make_client(&server);
        let body = serde_json::to_value(client.body_for(&request)).unwrap();
        let content = &body["messages"][0]["content"];
        assert_eq!(content.as_array().unwrap().len(), 1);
        assert_eq!(content[0]["type"], "text");

        client.send(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_returns_raw_reply_not_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let reply = make_client(&server).send(&edit_request()).await.unwrap();
        assert_eq!(reply.status, 429);
        assert_eq!(reply.body, "quota exceeded");
    }
}
