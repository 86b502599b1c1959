//! Seams for the two external models: text completion and image generation.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{RecipeError, Result};

/// A text completion model.
///
/// Implementations make the network call and return the model's raw text;
/// they do not interpret it.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// An image generation model returning the URL of the generated image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Completion provider returning a canned response, for tests and offline runs.
#[derive(Debug)]
pub struct FakeCompletionProvider {
    response: std::result::Result<String, String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FakeCompletionProvider {
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|prompt| prompt.clone())
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletionProvider {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        self.response
            .clone()
            .map_err(RecipeError::CompletionFailed)
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

/// Image provider returning a fixed URL, optionally after a delay.
#[derive(Debug)]
pub struct FakeImageProvider {
    url: std::result::Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeImageProvider {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Ok(url.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            url: Err(message.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for FakeImageProvider {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.url.clone().map_err(RecipeError::ImageFailed)
    }

    fn model_name(&self) -> &str {
        "fake-image-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_completion_records_prompt() {
        let provider = FakeCompletionProvider::with_response("{}");
        let result = provider.complete("system", "make soup").await.unwrap();

        assert_eq!(result, "{}");
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.last_prompt().as_deref(), Some("make soup"));
    }

    #[tokio::test]
    async fn test_fake_completion_failure() {
        let provider = FakeCompletionProvider::failing("connection reset");
        let result = provider.complete("system", "make soup").await;
        assert!(matches!(result, Err(RecipeError::CompletionFailed(msg)) if msg == "connection reset"));
    }

    #[tokio::test]
    async fn test_fake_image_provider() {
        let provider = FakeImageProvider::with_url("https://img.example/1.png");
        assert_eq!(
            provider.generate("photo").await.unwrap(),
            "https://img.example/1.png"
        );
        assert!(FakeImageProvider::failing("quota").generate("photo").await.is_err());
    }
}
