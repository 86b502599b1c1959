use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use recipe_flow::{
    CompletionProvider, ImageCache, ImageProvider, ImageResolver, InMemoryImageCache,
    NormalizeOptions, Normalizer, Outcome, PLACEHOLDER_IMAGE, RecipeGenerator, RecipeRequest,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::{
    config::ServiceConfig,
    models::{GenerateImageRequest, GenerateImageResponse, GenerateRecipeResponse},
    providers::{OpenAiImageGenerator, OpenRouterCompletion},
};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<RecipeGenerator>,
    /// Present only when an image provider is configured.
    pub images: Option<ImageResolver>,
    pub strict_requests: bool,
}

impl AppState {
    /// Wires providers into a generator and resolver that share one image cache.
    pub fn new(
        completion: Arc<dyn CompletionProvider>,
        image_provider: Option<Arc<dyn ImageProvider>>,
        config: &ServiceConfig,
    ) -> Self {
        let cache: Arc<dyn ImageCache> = Arc::new(InMemoryImageCache::new());
        let images = image_provider.map(|provider| ImageResolver::new(provider, cache));

        let normalizer = Normalizer::new(NormalizeOptions {
            ingredient_style: config.ingredient_style,
        });
        let mut generator = RecipeGenerator::new(completion).with_normalizer(normalizer);
        if config.inline_images {
            if let Some(images) = &images {
                generator = generator.with_images(images.clone());
            }
        }

        Self {
            generator: Arc::new(generator),
            images,
            strict_requests: config.strict_requests,
        }
    }
}

pub fn create_app(config: &ServiceConfig) -> Router {
    let completion: Arc<dyn CompletionProvider> = Arc::new(OpenRouterCompletion::new(
        &config.openrouter_api_key,
        config.model.clone(),
    ));

    let image_provider = config.images.clone().map(|images| {
        let provider: Arc<dyn ImageProvider> = Arc::new(OpenAiImageGenerator::new(images));
        provider
    });
    if image_provider.is_none() {
        warn!("OPENAI_API_KEY not set, image generation disabled");
    }

    build_router(AppState::new(completion, image_provider, config))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/generate-recipe", post(generate_recipe))
        .route("/api/generate-image", post(generate_image))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Recipe Generation Service",
        "version": "1.0.0",
        "description": "Generates recipes from ingredients and preferences, with optional dish images",
        "endpoints": {
            "POST /api/generate-recipe": "Generate a recipe from ingredients",
            "POST /api/generate-image": "Get an image URL for a recipe",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn generate_recipe(
    State(state): State<AppState>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> ApiResult<GenerateRecipeResponse> {
    let request_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) if state.strict_requests => {
            warn!(%request_id, error = %rejection, "Rejecting malformed recipe request");
            return Err(bad_request_error(&rejection.body_text()));
        }
        Err(rejection) => {
            warn!(%request_id, error = %rejection, "Malformed recipe request, using empty request");
            RecipeRequest::default()
        }
    };

    if state.strict_requests {
        request
            .validate()
            .map_err(|e| bad_request_error(&e.to_string()))?;
    }

    info!(
        %request_id,
        ingredients = %request.ingredients,
        cuisine = request.cuisine().unwrap_or("any"),
        "Generating recipe"
    );

    let generation = state
        .generator
        .generate(&request)
        .instrument(info_span!("generate_recipe", %request_id))
        .await;

    info!(
        %request_id,
        recipe = %generation.recipe.name,
        outcome = generation.outcome.label(),
        "Recipe generated"
    );
    if let Outcome::FullFallback { reason } = &generation.outcome {
        warn!(%request_id, %reason, "Served fallback recipe");
    }

    Ok(Json(GenerateRecipeResponse {
        recipe: generation.recipe,
    }))
}

async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Json<GenerateImageResponse> {
    let request_id = Uuid::new_v4();

    let request = payload.map(|Json(request)| request).unwrap_or_else(|rejection| {
        warn!(%request_id, error = %rejection, "Malformed image request");
        GenerateImageRequest::default()
    });

    let image_url = match &state.images {
        Some(images) => {
            images
                .resolve(&request.recipe_name, request.description.as_deref())
                .instrument(info_span!("generate_image", %request_id))
                .await
        }
        None => PLACEHOLDER_IMAGE.to_string(),
    };

    info!(%request_id, recipe = %request.recipe_name, image_url = %image_url, "Image resolved");

    Json(GenerateImageResponse { image_url })
}
