//! Default values for recipe fields and the fully synthesized fallback recipe.

use std::collections::BTreeMap;

use crate::types::{Ingredient, PLACEHOLDER_IMAGE, Recipe, RecipeRequest};

pub const REPAIRED_NAME: &str = "Custom Recipe";
pub const FALLBACK_NAME: &str = "Simple Recipe";
pub const DESCRIPTION: &str = "A custom recipe based on your ingredients.";
pub const INSTRUCTION: &str = "Cook the ingredients to your preference.";
pub const PREP_TIME: &str = "15 mins";
pub const COOK_TIME: &str = "20 mins";
pub const SERVINGS: &str = "2";
pub const TAG: &str = "custom";
pub const TIP: &str = "Adjust seasoning to taste.";

pub fn name(_: &RecipeRequest) -> String {
    REPAIRED_NAME.to_string()
}

pub fn description(_: &RecipeRequest) -> String {
    DESCRIPTION.to_string()
}

pub fn ingredients(request: &RecipeRequest) -> Vec<Ingredient> {
    request
        .ingredient_list()
        .into_iter()
        .map(Ingredient::Text)
        .collect()
}

pub fn instructions(_: &RecipeRequest) -> Vec<String> {
    vec![INSTRUCTION.to_string()]
}

pub fn prep_time(_: &RecipeRequest) -> String {
    PREP_TIME.to_string()
}

pub fn cook_time(_: &RecipeRequest) -> String {
    COOK_TIME.to_string()
}

pub fn servings(_: &RecipeRequest) -> String {
    SERVINGS.to_string()
}

pub fn tags(request: &RecipeRequest) -> Vec<String> {
    vec![request.cuisine().unwrap_or(TAG).to_string()]
}

pub fn nutritional_info(_: &RecipeRequest) -> BTreeMap<String, String> {
    BTreeMap::from([("calories".to_string(), "Varies".to_string())])
}

pub fn tips(_: &RecipeRequest) -> Vec<String> {
    vec![TIP.to_string()]
}

/// Build a recipe from the request alone.
pub fn fallback_recipe(request: &RecipeRequest) -> Recipe {
    let description = if request.has_ingredients() {
        format!("A simple recipe made with {}.", request.ingredients.trim())
    } else {
        "A simple recipe made with your ingredients.".to_string()
    };

    Recipe {
        name: FALLBACK_NAME.to_string(),
        description,
        ingredients: ingredients(request),
        instructions: instructions(request),
        prep_time: Some(prep_time(request)),
        cook_time: Some(cook_time(request)),
        servings: Some(servings(request)),
        tags: tags(request),
        nutritional_info: Some(nutritional_info(request)),
        tips: Some(tips(request)),
        image: PLACEHOLDER_IMAGE.to_string(),
    }
}
