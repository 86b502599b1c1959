use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{RecipeError, Result};

/// Image path used whenever no generated image is available.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Values a form sends when the user picked "no preference".
const NO_PREFERENCE: [&str; 2] = ["none", "any"];

/// Parameters for a single recipe generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    /// Comma-separated free text; a JSON array is joined with ", "
    #[serde(default, deserialize_with = "ingredients_text")]
    pub ingredients: String,
    #[serde(default)]
    pub dietary_preference: Option<String>,
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub additional_preferences: Option<String>,
    #[serde(default, deserialize_with = "loose_bool")]
    pub quick_meal: bool,
}

fn ingredients_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn loose_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

impl RecipeRequest {
    pub fn new(ingredients: impl Into<String>) -> Self {
        Self {
            ingredients: ingredients.into(),
            ..Default::default()
        }
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine_type = Some(cuisine.into());
        self
    }

    /// Ingredient text split on commas, trimmed, empty pieces dropped.
    pub fn ingredient_list(&self) -> Vec<String> {
        self.ingredients
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn has_ingredients(&self) -> bool {
        !self.ingredients.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.has_ingredients() {
            return Err(RecipeError::InvalidRequest(
                "ingredients are required".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the trimmed value unless it is blank or a "no preference" sentinel.
    pub fn preference(value: Option<&str>) -> Option<&str> {
        let value = value?.trim();
        if value.is_empty()
            || NO_PREFERENCE
                .iter()
                .any(|sentinel| value.eq_ignore_ascii_case(sentinel))
        {
            return None;
        }
        Some(value)
    }

    pub fn dietary(&self) -> Option<&str> {
        Self::preference(self.dietary_preference.as_deref())
    }

    pub fn cuisine(&self) -> Option<&str> {
        Self::preference(self.cuisine_type.as_deref())
    }

    pub fn meal(&self) -> Option<&str> {
        Self::preference(self.meal_type.as_deref())
    }

    pub fn extra_preferences(&self) -> Option<&str> {
        self.additional_preferences
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A recipe ingredient, either free text or a measured pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ingredient {
    Measured { ingredient: String, amount: String },
    Text(String),
}

impl Ingredient {
    pub fn text(value: impl Into<String>) -> Self {
        Ingredient::Text(value.into())
    }

    pub fn measured(ingredient: impl Into<String>, amount: impl Into<String>) -> Self {
        Ingredient::Measured {
            ingredient: ingredient.into(),
            amount: amount.into(),
        }
    }

    /// Flattened display form, `"<amount> <ingredient>"` for measured pairs.
    pub fn display(&self) -> String {
        match self {
            Ingredient::Text(text) => text.clone(),
            Ingredient::Measured { ingredient, amount } => format!("{} {}", amount, ingredient),
        }
    }

    pub fn flattened(self) -> Self {
        match self {
            Ingredient::Measured { .. } => Ingredient::Text(self.display()),
            text => text,
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// A normalized recipe, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
    pub image: String,
}

impl Recipe {
    pub fn has_placeholder_image(&self) -> bool {
        self.image == PLACEHOLDER_IMAGE
    }
}
