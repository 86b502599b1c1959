//! Service configuration from environment variables.

use recipe_flow::IngredientStyle;
use std::env;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-2";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Image generation settings; absent when no image API key is configured.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub api_key: String,
    pub model: String,
    pub size: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// API key for OpenRouter.
    pub openrouter_api_key: String,
    /// Completion model name (e.g., "openai/gpt-4o-mini").
    pub model: String,
    pub images: Option<ImageConfig>,
    /// Resolve images while generating a recipe, not only on the image endpoint.
    pub inline_images: bool,
    /// Reject malformed bodies and blank ingredients with 400 instead of falling back.
    pub strict_requests: bool,
    pub ingredient_style: IngredientStyle,
    pub log_format: LogFormat,
    pub port: u16,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `OPENROUTER_API_KEY`
    ///
    /// Optional:
    /// - `RECIPE_MODEL` (default: "openai/gpt-4o-mini")
    /// - `OPENAI_API_KEY`: enables image generation
    /// - `RECIPE_IMAGE_MODEL` (default: "dall-e-2")
    /// - `RECIPE_IMAGE_SIZE` (default: "1024x1024")
    /// - `RECIPE_IMAGE_BASE_URL` (default: "https://api.openai.com/v1")
    /// - `RECIPE_INLINE_IMAGES` (default: true)
    /// - `RECIPE_STRICT_REQUESTS` (default: false)
    /// - `RECIPE_INGREDIENT_STYLE`: "structured" or "flattened" (default: structured)
    /// - `RECIPE_LOG_FORMAT`: "pretty" or "json" (default: pretty)
    /// - `PORT` (default: 3000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let openrouter_api_key = var("OPENROUTER_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let model = var("RECIPE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let images = var("OPENAI_API_KEY").map(|api_key| ImageConfig {
            api_key,
            model: var("RECIPE_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            size: var("RECIPE_IMAGE_SIZE").unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string()),
            base_url: var("RECIPE_IMAGE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string()),
        });

        let inline_images = parse_flag("RECIPE_INLINE_IMAGES", var("RECIPE_INLINE_IMAGES"), true)?;
        let strict_requests =
            parse_flag("RECIPE_STRICT_REQUESTS", var("RECIPE_STRICT_REQUESTS"), false)?;

        let ingredient_style = match var("RECIPE_INGREDIENT_STYLE") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "RECIPE_INGREDIENT_STYLE".to_string(),
                value,
            })?,
            None => IngredientStyle::default(),
        };

        let log_format = match var("RECIPE_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "RECIPE_LOG_FORMAT".to_string(),
                    value: other.to_string(),
                });
            }
        };

        let port = match var("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                value,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            openrouter_api_key,
            model,
            images,
            inline_images,
            strict_requests,
            ingredient_style,
            log_format,
            port,
        })
    }
}

fn parse_flag(name: &str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
    }
}
