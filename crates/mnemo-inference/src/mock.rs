//! Mock chat backend for deterministic testing.
//!
//! Scripted outcomes are consumed front-to-back; once the script is empty,
//! every call returns the default response. Downstream crates use this in
//! their tests, so it is compiled unconditionally.
//!
//! ## Usage
//!
//! ```rust
//! use mnemo_inference::mock::MockChatBackend;
//! use mnemo_core::ChatBackend;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = MockChatBackend::new().with_default_response("{\"title\": \"T\"}");
//! let text = backend.complete("prompt").await.unwrap();
//! assert_eq!(text, "{\"title\": \"T\"}");
//! assert_eq!(backend.call_count(), 1);
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mnemo_core::{ChatBackend, Error, Result};

/// A single recorded call for assertions.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub prompt: String,
}

/// Mock chat backend with a scripted outcome queue and a call log.
///
/// Prompt rules take precedence over the queue: the first rule whose needle
/// occurs in the prompt is consumed and returned. Rules keep concurrent
/// callers deterministic when completion order is not.
#[derive(Clone)]
pub struct MockChatBackend {
    script: Arc<Mutex<VecDeque<Result<String>>>>,
    prompt_rules: Arc<Mutex<Vec<(String, Result<String>)>>>,
    default_response: Arc<Mutex<String>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatBackend {
    /// Create a new mock backend with an empty script.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            prompt_rules: Arc::new(Mutex::new(Vec::new())),
            default_response: Arc::new(Mutex::new("mock response".to_string())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned once the script is exhausted.
    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        *self.default_response.lock().unwrap() = response.into();
        self
    }

    /// Queue a successful response.
    pub fn push_response(&self, response: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(response.into()));
    }

    /// Queue a failure.
    pub fn push_failure(&self, error: Error) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Queue a successful response (builder form).
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push_response(response);
        self
    }

    /// Queue a failure (builder form).
    pub fn with_failure(self, error: Error) -> Self {
        self.push_failure(error);
        self
    }

    /// Respond with `response` to the next prompt containing `needle`.
    pub fn with_prompt_response(self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.prompt_rules
            .lock()
            .unwrap()
            .push((needle.into(), Ok(response.into())));
        self
    }

    /// Fail the next prompt containing `needle`.
    pub fn with_prompt_failure(self, needle: impl Into<String>, error: Error) -> Self {
        self.prompt_rules
            .lock()
            .unwrap()
            .push((needle.into(), Err(error)));
        self
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Total number of calls across both operations.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Number of vision calls.
    pub fn vision_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == "complete_with_image")
            .count()
    }

    fn next_outcome(&self, operation: &str, prompt: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            prompt: prompt.to_string(),
        });

        let mut rules = self.prompt_rules.lock().unwrap();
        if let Some(pos) = rules
            .iter()
            .position(|(needle, _)| prompt.contains(needle.as_str()))
        {
            return rules.remove(pos).1;
        }
        drop(rules);

        match self.script.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(self.default_response.lock().unwrap().clone()),
        }
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.next_outcome("complete", prompt)
    }

    async fn complete_with_image(
        &self,
        prompt: &str,
        _image_data: &[u8],
        _mime_type: &str,
    ) -> Result<String> {
        self.next_outcome("complete_with_image", prompt)
    }

    fn text_model(&self) -> &str {
        "mock-text"
    }

    fn vision_model(&self) -> &str {
        "mock-vision"
    }
}
