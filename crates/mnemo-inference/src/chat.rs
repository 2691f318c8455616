//! OpenAI-compatible chat-completions backend implementation.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use mnemo_core::{ChatBackend, Error, Result};

use crate::config::InferenceConfig;

/// How much of an upstream error body to keep in the error message.
const ERROR_BODY_PREVIEW: usize = 500;

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Request body for the chat completions endpoint.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

/// A single chat message; vision messages carry structured content parts.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChatMessage {
    Text { role: String, content: String },
    Vision { role: String, content: Vec<ContentPart> },
}

/// One part of a vision message's content.
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

/// Response from the chat completions endpoint.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

// =============================================================================
// BACKEND
// =============================================================================

/// OpenAI-compatible chat backend for text and vision completion.
pub struct OpenAiChatBackend {
    client: Client,
    config: InferenceConfig,
}

impl OpenAiChatBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            text_model = %config.text_model,
            vision_model = %config.vision_model,
            "Initializing chat backend"
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Send a chat request and return the first choice's trimmed content.
    async fn send(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
        };

        let mut req = self.client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > ERROR_BODY_PREVIEW {
                let mut cut = ERROR_BODY_PREVIEW;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Malformed completion response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generation("no choices returned".to_string()))?;

        let content = choice.message.content.trim().to_string();
        debug!(model = %model, response_len = content.len(), "Completion received");
        Ok(content)
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            model = %self.config.text_model,
            prompt_len = prompt.len(),
            "Sending text completion"
        );
        let messages = vec![ChatMessage::Text {
            role: "user".to_string(),
            content: prompt.to_string(),
        }];
        self.send(&self.config.text_model, messages).await
    }

    async fn complete_with_image(
        &self,
        prompt: &str,
        image_data: &[u8],
        mime_type: &str,
    ) -> Result<String> {
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(image_data);
        let data_url = format!("data:{};base64,{}", mime_type, image_b64);

        debug!(
            model = %self.config.vision_model,
            image_bytes = image_data.len(),
            "Sending vision completion"
        );

        let messages = vec![ChatMessage::Vision {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ],
        }];
        self.send(&self.config.vision_model, messages).await
    }

    fn text_model(&self) -> &str {
        &self.config.text_model
    }

    fn vision_model(&self) -> &str {
        &self.config.vision_model
    }
}
