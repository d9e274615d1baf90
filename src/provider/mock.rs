use super::{GenerationBackend, RawReply};
use crate::models::GenerationRequest;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Minimal valid chat/completions reply used when no reply is queued.
const DEFAULT_REPLY_BODY: &str = r#"{"choices":[{"message":{"images":[{"image_url":{"url":"data:image/png;base64,iVBORw0KGgo="}}]}}]}"#;

#[derive(Clone)]
pub struct MockGenerationClient {
    replies: Arc<Mutex<Vec<RawReply>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_reply(self, status: u16, body: &str) -> Self {
        self.replies.lock().unwrap().push(RawReply {
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The most recent composed request observed by this backend.
    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationClient {
    async fn send(&self, request: &GenerationRequest) -> Result<RawReply> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        self.requests.lock().unwrap().push(request.clone());

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok(RawReply {
                status: 200,
                body: DEFAULT_REPLY_BODY.to_string(),
            })
        } else {
            let index = (*count - 1) % replies.len();
            Ok(replies[index].clone())
        }
    }
}
