//! Prompt text sent to the completion and image models.

use crate::types::RecipeRequest;

/// Preamble for the completion model.
pub const SYSTEM_PROMPT: &str = r#"You are a professional chef who creates delicious recipes based on available ingredients.
Given a list of ingredients and preferences, create a recipe that:
1. Uses the provided ingredients (you can suggest additional common ingredients if needed)
2. Follows any dietary preferences specified
3. Matches the cuisine type if specified
4. Is suitable for the meal type if specified
5. Can be prepared quickly if the quick meal option is selected

IMPORTANT GUIDELINES:
- Provide DETAILED ingredients with SPECIFIC AMOUNTS (e.g., "2 tablespoons olive oil" not just "olive oil")
- List ALL ingredients needed for the recipe, not just the ones provided
- For instructions, provide ONLY the step text WITHOUT numbering (the frontend will add numbers)
- Ensure the JSON is valid and properly formatted
- Keep the recipe practical and achievable for home cooks
"#;

const CLOSING_CLAUSE: &str = " Include a name, description, ingredients with measurements, step-by-step instructions, preparation and cooking time, servings, tags, and estimated nutritional information. Also provide some cooking tips.";

// The normalizer reads these field names, keep them in sync with `normalize::schema`.
const SHAPE_CLAUSE: &str = r#" Format the response as a valid JSON object matching this structure:
{
  "name": "Recipe Name",
  "description": "Description",
  "ingredients": [
    {"ingredient": "ingredient name 1", "amount": "amount 1"},
    {"ingredient": "ingredient name 2", "amount": "amount 2"}
  ],
  "instructions": ["step 1", "step 2"],
  "prepTime": "X mins",
  "cookTime": "Y mins",
  "servings": "Z",
  "tags": ["tag1", "tag2"],
  "nutritionalInfo": {
    "calories": "X",
    "protein": "Y",
    "carbs": "Z",
    "fat": "W"
  },
  "tips": ["tip 1", "tip 2"]
}"#;

const INGREDIENT_CLAUSE: &str = r#" IMPORTANT: For each ingredient, always include both the ingredient name and amount as separate fields. For example, use {"ingredient": "steak", "amount": "8 oz"} instead of just measurements or just names."#;

/// Render the user prompt for a request.
pub fn build_prompt(request: &RecipeRequest) -> String {
    let mut prompt = format!(
        "Create a detailed recipe using these ingredients: {}.",
        request.ingredients.trim()
    );

    if let Some(diet) = request.dietary() {
        prompt.push_str(&format!(" The recipe should be {}.", diet));
    }

    if let Some(cuisine) = request.cuisine() {
        prompt.push_str(&format!(" It should be {} cuisine.", cuisine));
    }

    if let Some(meal) = request.meal() {
        prompt.push_str(&format!(" This is for a {} meal.", meal));
    }

    if request.quick_meal {
        prompt.push_str(" It should be a quick meal that can be prepared in 30 minutes or less.");
    }

    if let Some(extra) = request.extra_preferences() {
        prompt.push_str(&format!(" Additional preferences: {}.", extra));
    }

    prompt.push_str(CLOSING_CLAUSE);
    prompt.push_str(SHAPE_CLAUSE);
    prompt.push_str(INGREDIENT_CLAUSE);
    prompt
}

/// Prompt for an illustrative photo of a recipe.
pub fn image_prompt(name: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => format!(
            "A professional food photography style image of {}. {}. Top-down view, on a beautiful plate, with garnish, high resolution, photorealistic.",
            name.trim(),
            description.trim_end_matches('.')
        ),
        None => format!("Food photo of {}. Top-down view.", name.trim()),
    }
}
