//! Configuration for the generative service backend.

use mnemo_core::defaults;

/// Configuration for an OpenAI-compatible chat-completions backend.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Base URL of the API endpoint (without the `/chat/completions` suffix).
    pub base_url: String,
    /// API key for bearer authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model used for text generation.
    pub text_model: String,
    /// Model used for vision calls (image transcription).
    pub vision_model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::INFERENCE_BASE_URL.to_string(),
            api_key: None,
            text_model: defaults::TEXT_MODEL.to_string(),
            vision_model: defaults::VISION_MODEL.to_string(),
            timeout_secs: defaults::GEN_TIMEOUT_SECS,
        }
    }
}

impl InferenceConfig {
    /// Create from environment variables (with defaults).
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `MNEMO_INFERENCE_URL` | Groq OpenAI-compatible endpoint |
    /// | `MNEMO_API_KEY` | unset |
    /// | `MNEMO_TEXT_MODEL` | `openai/gpt-oss-120b` |
    /// | `MNEMO_VISION_MODEL` | `meta-llama/llama-4-scout-17b-16e-instruct` |
    /// | `MNEMO_GEN_TIMEOUT_SECS` | `60` |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("MNEMO_INFERENCE_URL")
                .unwrap_or_else(|_| defaults::INFERENCE_BASE_URL.to_string()),
            api_key: std::env::var("MNEMO_API_KEY").ok(),
            text_model: std::env::var("MNEMO_TEXT_MODEL")
                .unwrap_or_else(|_| defaults::TEXT_MODEL.to_string()),
            vision_model: std::env::var("MNEMO_VISION_MODEL")
                .unwrap_or_else(|_| defaults::VISION_MODEL.to_string()),
            timeout_secs: std::env::var("MNEMO_GEN_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::GEN_TIMEOUT_SECS),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.base_url, defaults::INFERENCE_BASE_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.text_model, defaults::TEXT_MODEL);
        assert_eq!(config.vision_model, defaults::VISION_MODEL);
        assert_eq!(config.timeout_secs, defaults::GEN_TIMEOUT_SECS);
    }

    #[test]
    fn test_builder_chaining() {
        let config = InferenceConfig::default()
            .with_api_key("sk-test")
            .with_base_url("http://localhost:8080/v1");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
    }
}
