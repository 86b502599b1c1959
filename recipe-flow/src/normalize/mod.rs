//! Turning raw model completions into recipes.
//!
//! The pipeline runs in stages: extract a JSON candidate, parse it, check
//! that the recipe's core fields are intact, then fill or coerce every
//! remaining field. Each run reports an [`Outcome`] describing how much of
//! the model's output survived. Nothing here fails: unusable output
//! becomes the fallback recipe built from the request.

mod extract;
pub mod schema;

pub use extract::{Candidate, CandidateSource, extract_candidate};
pub use schema::strip_step_number;

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::defaults::fallback_recipe;
use crate::types::{Recipe, RecipeRequest};
use schema::{Field, Slot};

/// How ingredient pairs are stored in the returned recipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngredientStyle {
    /// Keep `{ingredient, amount}` pairs as they arrived
    #[default]
    Structured,
    /// Flatten pairs to `"<amount> <ingredient>"`
    Flattened,
}

impl FromStr for IngredientStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "structured" => Ok(IngredientStyle::Structured),
            "flattened" | "flat" => Ok(IngredientStyle::Flattened),
            other => Err(format!("unknown ingredient style: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub ingredient_style: IngredientStyle,
}

/// Why a recipe was synthesized from the request alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    EmptyCompletion,
    InvalidJson(String),
    NotAnObject,
    NoUsableData,
    MissingIngredients,
    CompletionFailed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::EmptyCompletion => write!(f, "empty completion"),
            FallbackReason::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            FallbackReason::NotAnObject => write!(f, "completion JSON is not an object"),
            FallbackReason::NoUsableData => write!(f, "no usable recipe fields"),
            FallbackReason::MissingIngredients => write!(f, "request has no ingredients"),
            FallbackReason::CompletionFailed(e) => write!(f, "completion failed: {}", e),
        }
    }
}

/// Result of one normalization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Name and ingredients were usable; `coerced` lists fields replaced by defaults
    Parsed { coerced: Vec<&'static str> },
    /// Name or ingredients were unusable; `repaired` lists every defaulted field
    PartiallyRepaired { repaired: Vec<&'static str> },
    FullFallback { reason: FallbackReason },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Parsed { .. } => "parsed",
            Outcome::PartiallyRepaired { .. } => "partially_repaired",
            Outcome::FullFallback { .. } => "full_fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::FullFallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub recipe: Recipe,
    pub outcome: Outcome,
}

impl Normalized {
    pub fn fallback(request: &RecipeRequest, reason: FallbackReason) -> Self {
        Self {
            recipe: fallback_recipe(request),
            outcome: Outcome::FullFallback { reason },
        }
    }
}

/// Normalize a completion with default options.
pub fn normalize(raw: &str, request: &RecipeRequest) -> Recipe {
    Normalizer::default().normalize(raw, request).recipe
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    pub fn normalize(&self, raw: &str, request: &RecipeRequest) -> Normalized {
        let candidate = extract_candidate(raw);
        debug!(source = ?candidate.source, length = candidate.text.len(), "Extracted completion candidate");

        let object = match parse_candidate(candidate.text) {
            Ok(object) => object,
            Err(reason) => {
                warn!(reason = %reason, "Falling back to request-derived recipe");
                debug!(candidate = candidate.text, "Unusable completion candidate");
                return Normalized::fallback(request, reason);
            }
        };

        match self.assemble(&object, request) {
            Some(normalized) => normalized,
            None => {
                warn!("Completion JSON has no usable recipe fields");
                Normalized::fallback(request, FallbackReason::NoUsableData)
            }
        }
    }

    /// Build a recipe from a parsed object, or `None` if nothing in it is usable.
    fn assemble(&self, object: &Map<String, Value>, request: &RecipeRequest) -> Option<Normalized> {
        let name = schema::NAME.inspect(object);
        let ingredients = schema::INGREDIENTS.inspect(object);
        let intact = name.is_valid() && ingredients.is_valid();

        if !intact && !schema::has_usable_field(object) {
            return None;
        }

        let mut fill = Filler {
            request,
            intact,
            defaulted: Vec::new(),
        };

        let mut recipe = Recipe {
            name: fill.required(&schema::NAME, name),
            description: fill.required(&schema::DESCRIPTION, schema::DESCRIPTION.inspect(object)),
            ingredients: fill.required(&schema::INGREDIENTS, ingredients),
            instructions: fill.required(&schema::INSTRUCTIONS, schema::INSTRUCTIONS.inspect(object)),
            prep_time: fill.optional(&schema::PREP_TIME, schema::PREP_TIME.inspect(object)),
            cook_time: fill.optional(&schema::COOK_TIME, schema::COOK_TIME.inspect(object)),
            servings: fill.optional(&schema::SERVINGS, schema::SERVINGS.inspect(object)),
            tags: fill.list(&schema::TAGS, schema::TAGS.inspect(object)),
            nutritional_info: fill.optional(
                &schema::NUTRITIONAL_INFO,
                schema::NUTRITIONAL_INFO.inspect(object),
            ),
            tips: fill.optional(&schema::TIPS, schema::TIPS.inspect(object)),
            image: match schema::IMAGE.inspect(object) {
                Slot::Valid(image) => image,
                _ => schema::IMAGE.default_for(request),
            },
        };

        if self.options.ingredient_style == IngredientStyle::Flattened {
            recipe.ingredients = recipe
                .ingredients
                .into_iter()
                .map(|ingredient| ingredient.flattened())
                .collect();
        }

        let outcome = if intact {
            Outcome::Parsed {
                coerced: fill.defaulted,
            }
        } else {
            warn!(repaired = ?fill.defaulted, "Repaired incomplete recipe JSON");
            Outcome::PartiallyRepaired {
                repaired: fill.defaulted,
            }
        };

        Some(Normalized { recipe, outcome })
    }
}

fn parse_candidate(text: &str) -> Result<Map<String, Value>, FallbackReason> {
    if text.trim().is_empty() {
        return Err(FallbackReason::EmptyCompletion);
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(FallbackReason::NotAnObject),
        Err(e) => Err(FallbackReason::InvalidJson(e.to_string())),
    }
}

/// Applies the default table and records which fields it touched.
struct Filler<'a> {
    request: &'a RecipeRequest,
    /// Name and ingredients were usable
    intact: bool,
    defaulted: Vec<&'static str>,
}

impl Filler<'_> {
    fn default_of<T>(&mut self, field: &Field<T>) -> T {
        self.defaulted.push(field.key);
        field.default_for(self.request)
    }

    /// Fields every recipe carries.
    fn required<T>(&mut self, field: &Field<T>, slot: Slot<T>) -> T {
        match slot {
            Slot::Valid(value) => value,
            Slot::Invalid | Slot::Absent => self.default_of(field),
        }
    }

    /// Optional fields stay absent on an intact recipe, but are filled during repair.
    fn optional<T>(&mut self, field: &Field<T>, slot: Slot<T>) -> Option<T> {
        match slot {
            Slot::Valid(value) => Some(value),
            Slot::Absent if self.intact => None,
            Slot::Invalid | Slot::Absent => Some(self.default_of(field)),
        }
    }

    /// Lists that may legitimately be empty on an intact recipe.
    fn list<T>(&mut self, field: &Field<Vec<T>>, slot: Slot<Vec<T>>) -> Vec<T> {
        match slot {
            Slot::Valid(value) => value,
            Slot::Absent if self.intact => Vec::new(),
            Slot::Invalid | Slot::Absent => self.default_of(field),
        }
    }
}
