//! Per-field readers and defaults for the recipe JSON shape.
//!
//! Every field the model is asked to produce is described by a [`Field`]:
//! its JSON key, a reader that accepts the value only when it has a usable
//! shape, and the default used when it is missing or malformed.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::defaults;
use crate::types::{Ingredient, RecipeRequest};

/// "1.", "1)", "(1)", "Step 1:", "step 2 -" at the start of a step.
static STEP_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:step\s*\d+\s*[:.)\-]?|\(\d+\)|\d+\)|(?P<dot>\d+\.))\s*")
        .expect("Invalid regex")
});

/// What was found under a field's key.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Valid(T),
    /// Present, but not in a usable shape
    Invalid,
    /// Missing or null
    Absent,
}

impl<T> Slot<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Slot::Valid(_))
    }
}

pub struct Field<T> {
    pub key: &'static str,
    read: fn(&Value) -> Option<T>,
    default: fn(&RecipeRequest) -> T,
}

impl<T> Field<T> {
    pub fn inspect(&self, object: &Map<String, Value>) -> Slot<T> {
        match object.get(self.key) {
            None | Some(Value::Null) => Slot::Absent,
            Some(value) => (self.read)(value).map_or(Slot::Invalid, Slot::Valid),
        }
    }

    pub fn default_for(&self, request: &RecipeRequest) -> T {
        (self.default)(request)
    }
}

pub const NAME: Field<String> = Field {
    key: "name",
    read: read_text,
    default: defaults::name,
};

pub const DESCRIPTION: Field<String> = Field {
    key: "description",
    read: read_text,
    default: defaults::description,
};

pub const INGREDIENTS: Field<Vec<Ingredient>> = Field {
    key: "ingredients",
    read: read_ingredients,
    default: defaults::ingredients,
};

pub const INSTRUCTIONS: Field<Vec<String>> = Field {
    key: "instructions",
    read: read_instructions,
    default: defaults::instructions,
};

pub const PREP_TIME: Field<String> = Field {
    key: "prepTime",
    read: read_text,
    default: defaults::prep_time,
};

pub const COOK_TIME: Field<String> = Field {
    key: "cookTime",
    read: read_text,
    default: defaults::cook_time,
};

pub const SERVINGS: Field<String> = Field {
    key: "servings",
    read: read_text,
    default: defaults::servings,
};

pub const TAGS: Field<Vec<String>> = Field {
    key: "tags",
    read: read_text_list,
    default: defaults::tags,
};

pub const NUTRITIONAL_INFO: Field<BTreeMap<String, String>> = Field {
    key: "nutritionalInfo",
    read: read_text_map,
    default: defaults::nutritional_info,
};

pub const TIPS: Field<Vec<String>> = Field {
    key: "tips",
    read: read_text_list,
    default: defaults::tips,
};

pub const IMAGE: Field<String> = Field {
    key: "image",
    read: read_text,
    default: placeholder_image,
};

fn placeholder_image(_: &RecipeRequest) -> String {
    crate::types::PLACEHOLDER_IMAGE.to_string()
}

/// True when at least one known field holds a usable value.
pub fn has_usable_field(object: &Map<String, Value>) -> bool {
    NAME.inspect(object).is_valid()
        || DESCRIPTION.inspect(object).is_valid()
        || INGREDIENTS.inspect(object).is_valid()
        || INSTRUCTIONS.inspect(object).is_valid()
        || PREP_TIME.inspect(object).is_valid()
        || COOK_TIME.inspect(object).is_valid()
        || SERVINGS.inspect(object).is_valid()
        || TAGS.inspect(object).is_valid()
        || NUTRITIONAL_INFO.inspect(object).is_valid()
        || TIPS.inspect(object).is_valid()
}

/// Non-blank strings, and numbers rendered as text.
fn read_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_text_list(value: &Value) -> Option<Vec<String>> {
    Some(value.as_array()?.iter().filter_map(read_text).collect())
}

fn read_instructions(value: &Value) -> Option<Vec<String>> {
    Some(
        read_text_list(value)?
            .iter()
            .map(|step| strip_step_number(step))
            .filter(|step| !step.is_empty())
            .collect(),
    )
}

fn read_text_map(value: &Value) -> Option<BTreeMap<String, String>> {
    Some(
        value
            .as_object()?
            .iter()
            .filter_map(|(key, value)| read_text(value).map(|text| (key.clone(), text)))
            .collect(),
    )
}

fn read_ingredients(value: &Value) -> Option<Vec<Ingredient>> {
    Some(value.as_array()?.iter().filter_map(read_ingredient).collect())
}

/// Accepts `"2 cups flour"`, `{"ingredient", "amount"}` or `{"name", "amount"}`.
fn read_ingredient(value: &Value) -> Option<Ingredient> {
    match value {
        Value::Object(entry) => {
            let name = entry
                .get("ingredient")
                .and_then(read_text)
                .or_else(|| entry.get("name").and_then(read_text));
            let amount = entry.get("amount").and_then(read_text);
            match (name, amount) {
                (Some(ingredient), Some(amount)) => Some(Ingredient::Measured { ingredient, amount }),
                (Some(text), None) | (None, Some(text)) => Some(Ingredient::Text(text)),
                (None, None) => None,
            }
        }
        other => read_text(other).map(Ingredient::Text),
    }
}

/// Remove leading step numbering until none is left.
pub fn strip_step_number(step: &str) -> String {
    let mut current = step.trim();
    while let Some(caps) = STEP_MARKER.captures(current) {
        let Some(marker) = caps.get(0).filter(|m| m.end() > 0) else {
            break;
        };
        // "1.5 cups" is a quantity, not a step number
        if let Some(dot) = caps.name("dot") {
            if current[dot.end()..].starts_with(|c: char| c.is_ascii_digit()) {
                break;
            }
        }
        current = current[marker.end()..].trim_start();
    }
    current.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_strip_step_number_variants() {
        assert_eq!(strip_step_number("1. Blend"), "Blend");
        assert_eq!(strip_step_number("2) Heat"), "Heat");
        assert_eq!(strip_step_number("(3) Serve"), "Serve");
        assert_eq!(strip_step_number("Step 4: Rest"), "Rest");
        assert_eq!(strip_step_number("step 5 - Slice"), "Slice");
        assert_eq!(strip_step_number("  1. 2) Whisk  "), "Whisk");
        assert_eq!(strip_step_number("1.Blend"), "Blend");
        assert_eq!(strip_step_number("2)Heat"), "Heat");
    }

    #[test]
    fn test_strip_keeps_quantities_and_decimals() {
        assert_eq!(strip_step_number("2 eggs, beaten"), "2 eggs, beaten");
        assert_eq!(strip_step_number("1.5 cups of stock go in"), "1.5 cups of stock go in");
        assert_eq!(strip_step_number("3. 1.5 cups of stock"), "1.5 cups of stock");
        assert_eq!(strip_step_number("Steep the tea"), "Steep the tea");
    }

    #[test]
    fn test_strip_is_idempotent() {
        for step in ["1. 2 eggs, beaten", "Step 1: (2) Mix", "3) Bake"] {
            let once = strip_step_number(step);
            assert_eq!(strip_step_number(&once), once);
        }
    }

    #[test]
    fn test_slots_distinguish_absent_and_invalid() {
        let obj = object(json!({"name": "Stew", "tags": "italian", "tips": null}));

        assert_eq!(NAME.inspect(&obj), Slot::Valid("Stew".to_string()));
        assert_eq!(TAGS.inspect(&obj), Slot::Invalid);
        assert_eq!(TIPS.inspect(&obj), Slot::Absent);
        assert_eq!(SERVINGS.inspect(&obj), Slot::Absent);
    }

    #[test]
    fn test_blank_name_is_invalid() {
        let obj = object(json!({"name": "   "}));
        assert_eq!(NAME.inspect(&obj), Slot::Invalid);
    }

    #[test]
    fn test_numbers_become_text() {
        let obj = object(json!({"servings": 4, "nutritionalInfo": {"calories": 350, "fat": "12g", "notes": ["x"]}}));

        assert_eq!(SERVINGS.inspect(&obj), Slot::Valid("4".to_string()));
        let Slot::Valid(info) = NUTRITIONAL_INFO.inspect(&obj) else {
            panic!("nutritionalInfo should be valid");
        };
        assert_eq!(info.get("calories").map(String::as_str), Some("350"));
        assert_eq!(info.get("fat").map(String::as_str), Some("12g"));
        assert!(!info.contains_key("notes"));
    }

    #[test]
    fn test_ingredient_shapes_are_reconciled() {
        let obj = object(json!({"ingredients": [
            "2 cups flour",
            {"ingredient": "steak", "amount": "8 oz"},
            {"name": "salt", "amount": "1 pinch"},
            {"ingredient": "pepper"},
            {"amount": "3 eggs"},
            {"unit": "g"},
            null,
            7
        ]}));

        assert_eq!(
            INGREDIENTS.inspect(&obj),
            Slot::Valid(vec![
                Ingredient::text("2 cups flour"),
                Ingredient::measured("steak", "8 oz"),
                Ingredient::measured("salt", "1 pinch"),
                Ingredient::text("pepper"),
                Ingredient::text("3 eggs"),
                Ingredient::text("7"),
            ])
        );
    }

    #[test]
    fn test_instruction_numbering_is_stripped_on_read() {
        let obj = object(json!({"instructions": ["1. Blend", "2. Heat", "3.", 42]}));
        assert_eq!(
            INSTRUCTIONS.inspect(&obj),
            Slot::Valid(vec!["Blend".to_string(), "Heat".to_string(), "42".to_string()])
        );
    }

    #[test]
    fn test_usable_field_detection() {
        assert!(!has_usable_field(&object(json!({"foo": "bar", "name": ""}))));
        assert!(has_usable_field(&object(json!({"description": "Warm soup"}))));
    }
}
