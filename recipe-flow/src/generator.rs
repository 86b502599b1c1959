use std::sync::Arc;
use tracing::{info, warn};

use crate::image::ImageResolver;
use crate::normalize::{FallbackReason, Normalized, Normalizer, Outcome};
use crate::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::provider::CompletionProvider;
use crate::types::{Recipe, RecipeRequest};

/// Result of one generation: the recipe and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub recipe: Recipe,
    pub outcome: Outcome,
}

/// Runs prompt building, completion, normalization and image resolution in order.
pub struct RecipeGenerator {
    completion: Arc<dyn CompletionProvider>,
    normalizer: Normalizer,
    images: Option<ImageResolver>,
}

impl RecipeGenerator {
    pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
        Self {
            completion,
            normalizer: Normalizer::default(),
            images: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Resolve images for generated recipes before returning them.
    pub fn with_images(mut self, images: ImageResolver) -> Self {
        self.images = Some(images);
        self
    }

    /// Always returns a usable recipe.
    pub async fn generate(&self, request: &RecipeRequest) -> Generation {
        let Normalized {
            mut recipe,
            outcome,
        } = self.normalized_recipe(request).await;

        info!(
            recipe = %recipe.name,
            outcome = outcome.label(),
            ingredients = recipe.ingredients.len(),
            "Recipe ready"
        );

        if let Some(images) = &self.images {
            if recipe.has_placeholder_image() {
                recipe.image = images
                    .resolve(&recipe.name, Some(recipe.description.as_str()))
                    .await;
            }
        }

        Generation { recipe, outcome }
    }

    async fn normalized_recipe(&self, request: &RecipeRequest) -> Normalized {
        if !request.has_ingredients() {
            warn!("Request has no ingredients, skipping completion");
            return Normalized::fallback(request, FallbackReason::MissingIngredients);
        }

        let prompt = build_prompt(request);
        info!(
            model = self.completion.model_name(),
            prompt_length = prompt.len(),
            "Requesting recipe completion"
        );

        match self.completion.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => self.normalizer.normalize(&raw, request),
            Err(e) => {
                warn!(error = %e, "Completion failed, using fallback recipe");
                Normalized::fallback(request, FallbackReason::CompletionFailed(e.to_string()))
            }
        }
    }
}
