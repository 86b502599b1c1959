use thiserror::Error;

/// Errors raised at the edges of the recipe pipeline.
///
/// Normalization itself never fails; these surface from request validation
/// and from the external providers, and callers degrade them to fallbacks.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Completion request failed: {0}")]
    CompletionFailed(String),

    #[error("Image generation failed: {0}")]
    ImageFailed(String),
}

pub type Result<T> = std::result::Result<T, RecipeError>;
