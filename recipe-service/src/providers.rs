use async_trait::async_trait;
use recipe_flow::{CompletionProvider, ImageProvider, RecipeError, Result};
use reqwest::Client;
use rig::{client::CompletionClient, completion::Prompt, providers::openrouter};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ImageConfig;

pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u64 = 1000;

/// Chat completion through OpenRouter.
pub struct OpenRouterCompletion {
    client: openrouter::Client,
    model: String,
}

impl OpenRouterCompletion {
    pub fn new(api_key: &str, model: impl Into<String>) -> Self {
        Self {
            client: openrouter::Client::new(api_key),
            model: model.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterCompletion {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build();

        let response = agent
            .prompt(prompt)
            .await
            .map_err(|e| RecipeError::CompletionFailed(e.to_string()))?;

        debug!(model = %self.model, response_length = response.len(), "Completion received");
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Image generation against an OpenAI-compatible `/images/generations` endpoint.
pub struct OpenAiImageGenerator {
    client: Client,
    config: ImageConfig,
}

impl OpenAiImageGenerator {
    pub fn new(config: ImageConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.config.model,
            "prompt": prompt,
            "n": 1,
            "size": self.config.size
        });

        let url = format!(
            "{}/images/generations",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RecipeError::ImageFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecipeError::ImageFailed(format!("{}: {}", status, body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RecipeError::ImageFailed(e.to_string()))?;

        image_url(&body)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

fn image_url(body: &Value) -> Result<String> {
    body["data"][0]["url"]
        .as_str()
        .filter(|url| !url.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| RecipeError::ImageFailed("Response has no image URL".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_from_response() {
        let body = json!({"created": 1, "data": [{"url": "https://img.example/a.png"}]});
        assert_eq!(image_url(&body).unwrap(), "https://img.example/a.png");
    }

    #[test]
    fn test_image_url_missing() {
        assert!(image_url(&json!({"data": []})).is_err());
        assert!(image_url(&json!({"data": [{"url": ""}]})).is_err());
        assert!(image_url(&json!({"error": {"message": "nope"}})).is_err());
    }

    #[test]
    fn test_model_names() {
        let completion = OpenRouterCompletion::new("sk-test", "openai/gpt-4o-mini");
        assert_eq!(completion.model_name(), "openai/gpt-4o-mini");

        let images = OpenAiImageGenerator::new(ImageConfig {
            api_key: "sk-test".to_string(),
            model: "dall-e-2".to_string(),
            size: "1024x1024".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        });
        assert_eq!(images.model_name(), "dall-e-2");
    }
}
