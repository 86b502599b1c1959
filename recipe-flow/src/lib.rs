pub mod cache;
pub mod defaults;
pub mod error;
pub mod generator;
pub mod image;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use cache::{ImageCache, InMemoryImageCache, KeyMode};
pub use defaults::fallback_recipe;
pub use error::{RecipeError, Result};
pub use generator::{Generation, RecipeGenerator};
pub use image::ImageResolver;
pub use normalize::{
    FallbackReason, IngredientStyle, NormalizeOptions, Normalized, Normalizer, Outcome, normalize,
};
pub use prompt::{SYSTEM_PROMPT, build_prompt, image_prompt};
pub use provider::{CompletionProvider, FakeCompletionProvider, FakeImageProvider, ImageProvider};
pub use types::{Ingredient, PLACEHOLDER_IMAGE, Recipe, RecipeRequest};
