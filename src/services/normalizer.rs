//! Turns loosely-shaped model output into canonical `DishRecommendation`s.
//!
//! Models wrap the recommendation list in different ways: a bare array, an
//! object with a `recommendations` key, or an object whose only array sits under
//! some other key. Each shape is an explicit variant so the accepted inputs stay
//! auditable.

use serde_json::{Map, Value};

use crate::models::{placeholder_image_url, slugify, split_list, DishRecommendation};

pub const DEFAULT_RATING: f64 = 4.0;
const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;
pub const DEFAULT_LEVEL: &str = "medium";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("Model output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Model output contains no recommendation array")]
    MissingArray,

    #[error("Model returned an empty recommendation array")]
    EmptyArray,

    #[error("Model recommendations are not dish objects with a name")]
    MalformedItem,

    #[error("Model returned {0} usable recommendations, expected 3")]
    WrongCount(usize),
}

/// Where the recommendation array was found
#[derive(Debug, PartialEq)]
enum RecommendationShape {
    /// `[ {...}, ... ]`
    Array(Vec<Value>),
    /// `{ "recommendations": [ ... ] }`
    Wrapped(Vec<Value>),
    /// `{ "<anything>": [ ... ] }`, first array-valued entry in document order
    FirstArray(Vec<Value>),
}

impl RecommendationShape {
    fn detect(value: Value) -> Result<Self, ParseError> {
        match value {
            Value::Array(items) => Ok(Self::Array(items)),
            Value::Object(map) => {
                let mut first_array = None;
                for (key, entry) in map {
                    if let Value::Array(items) = entry {
                        if key == "recommendations" {
                            return Ok(Self::Wrapped(items));
                        }
                        first_array.get_or_insert(items);
                    }
                }
                first_array
                    .map(Self::FirstArray)
                    .ok_or(ParseError::MissingArray)
            }
            _ => Err(ParseError::MissingArray),
        }
    }

    fn into_items(self) -> Vec<Value> {
        match self {
            Self::Array(items) | Self::Wrapped(items) | Self::FirstArray(items) => items,
        }
    }
}

/// Parses raw model text into recommendations.
///
/// The count is not enforced here; the orchestrator trims or pads to 3.
pub fn normalize(raw: &str) -> Result<Vec<DishRecommendation>, ParseError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let items = RecommendationShape::detect(value)?.into_items();

    let first = items.first().ok_or(ParseError::EmptyArray)?;
    if !first.as_object().is_some_and(|o| o.contains_key("name")) {
        return Err(ParseError::MalformedItem);
    }

    let mut recommendations = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_object().and_then(coerce) {
            Some(rec) => recommendations.push(rec),
            None => tracing::warn!(index, "Skipping malformed recommendation item"),
        }
    }

    if recommendations.is_empty() {
        return Err(ParseError::MalformedItem);
    }

    Ok(recommendations)
}

/// Removes a surrounding ```json fence some models add despite the JSON output flag
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    let body = body.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    body.trim()
}

/// Coerces one dish object; `None` when it has no usable name
fn coerce(item: &Map<String, Value>) -> Option<DishRecommendation> {
    let name = text(item.get("name"))?;
    if name.trim().is_empty() {
        return None;
    }

    let id = text(item.get("id"))
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| slugify(&name));

    let cooking_time = match item.get("cookingTime") {
        Some(Value::Number(n)) => format!("{} mins", n),
        other => text(other).unwrap_or_default(),
    };

    let instructions = match item.get("instructions") {
        Some(Value::Array(steps)) => steps
            .iter()
            .filter_map(|s| text(Some(s)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => text(other).unwrap_or_default(),
    };

    let image_url = text(item.get("image_url"))
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| placeholder_image_url(&name));

    Some(DishRecommendation {
        id,
        cuisine: text(item.get("cuisine")).unwrap_or_default(),
        meal_type: text(item.get("mealType")).unwrap_or_default(),
        cooking_time,
        spice_level: level(item.get("spiceLevel")),
        difficulty: level(item.get("difficulty")),
        rating: rating(item.get("rating")),
        description: text(item.get("description")).unwrap_or_default(),
        ingredients: ingredients(item.get("ingredients")),
        instructions,
        reason: text(item.get("reason")).unwrap_or_default(),
        image_url,
        name,
    })
}

/// Strings pass through, numbers and booleans are stringified, anything else is absent
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn level(value: Option<&Value>) -> String {
    text(value)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Finite ratings are clamped into 1..=5; anything else gets the default
fn rating(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(MIN_RATING, MAX_RATING))
        .unwrap_or(DEFAULT_RATING)
}

fn ingredients(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|i| text(Some(i))).collect(),
        Some(Value::String(s)) => split_list(s),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dishes() -> Value {
        json!([
            {
                "id": "veg-pulao",
                "name": "Veg Pulao",
                "cuisine": "North Indian",
                "mealType": "Lunch",
                "cookingTime": "25 mins",
                "spiceLevel": "mild",
                "difficulty": "easy",
                "rating": 4.6,
                "description": "Fragrant rice with vegetables",
                "ingredients": ["rice", "peas", "carrot"],
                "instructions": "Cook everything together.",
                "reason": "Quick and mild, as you like it.",
                "image_url": "https://img.example.com/pulao.jpg"
            },
            { "name": "Lemon Rice", "ingredients": "rice, lemon , , curry leaves" },
            { "name": "Curd Rice", "rating": "4.8", "cookingTime": 15 }
        ])
    }

    #[test]
    fn test_all_shapes_extract_same_items() {
        let bare = dishes().to_string();
        let wrapped = json!({ "recommendations": dishes() }).to_string();
        let other_key = json!({ "note": "enjoy", "dishes": dishes() }).to_string();

        let from_bare = normalize(&bare).unwrap();
        assert_eq!(from_bare.len(), 3);
        assert_eq!(normalize(&wrapped).unwrap(), from_bare);
        assert_eq!(normalize(&other_key).unwrap(), from_bare);
    }

    #[test]
    fn test_first_array_in_document_order() {
        let raw = r#"{"b": [{"name": "First"}], "a": [{"name": "Second"}]}"#;
        let recs = normalize(raw).unwrap();
        assert_eq!(recs[0].name, "First");
    }

    #[test]
    fn test_string_ingredients_are_split() {
        let raw = json!([{ "name": "Khichdi", "ingredients": "rice, dal, ghee" }]).to_string();
        let recs = normalize(&raw).unwrap();
        assert_eq!(recs[0].ingredients, vec!["rice", "dal", "ghee"]);
    }

    #[test]
    fn test_defaults_applied() {
        let recs = normalize(&dishes().to_string()).unwrap();

        let full = &recs[0];
        assert_eq!(full.rating, 4.6);
        assert_eq!(full.spice_level, "mild");
        assert_eq!(full.image_url, "https://img.example.com/pulao.jpg");

        let sparse = &recs[1];
        assert_eq!(sparse.id, "lemon-rice");
        assert_eq!(sparse.rating, DEFAULT_RATING);
        assert_eq!(sparse.difficulty, "medium");
        assert_eq!(sparse.spice_level, "medium");
        assert_eq!(sparse.ingredients, vec!["rice", "lemon", "curry leaves"]);
        assert_eq!(sparse.image_url, "https://placehold.co/600x400?text=Lemon+Rice");

        let numeric = &recs[2];
        assert_eq!(numeric.rating, 4.8);
        assert_eq!(numeric.cooking_time, "15 mins");
        assert!(numeric.ingredients.is_empty());
    }

    #[test]
    fn test_rating_is_finite_and_in_range() {
        let raw = json!([
            { "name": "Dal", "rating": "NaN" },
            { "name": "Poha", "rating": "inf" },
            { "name": "Upma", "rating": 9.5 },
            { "name": "Idli", "rating": "0" },
            { "name": "Vada", "rating": " 3.5 " }
        ])
        .to_string();
        let ratings: Vec<f64> = normalize(&raw).unwrap().iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![DEFAULT_RATING, DEFAULT_RATING, 5.0, 1.0, 3.5]);

        let value = serde_json::to_value(&normalize(&raw).unwrap()[0]).unwrap();
        assert_eq!(value["rating"], json!(DEFAULT_RATING));
    }

    #[test]
    fn test_idempotent() {
        let raw = json!({ "recommendations": dishes() }).to_string();
        assert_eq!(normalize(&raw).unwrap(), normalize(&raw).unwrap());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            normalize("Here are some dishes you might like!"),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_rejected_shapes() {
        assert_eq!(normalize("\"just text\""), Err(ParseError::MissingArray));
        assert_eq!(normalize(r#"{"message": "no"}"#), Err(ParseError::MissingArray));
        assert_eq!(normalize("[]"), Err(ParseError::EmptyArray));
        assert_eq!(normalize(r#"{"recommendations": []}"#), Err(ParseError::EmptyArray));
        assert_eq!(normalize(r#"["Dal", "Rice"]"#), Err(ParseError::MalformedItem));
        assert_eq!(
            normalize(r#"[{"title": "Dal"}]"#),
            Err(ParseError::MalformedItem)
        );
    }

    #[test]
    fn test_malformed_later_items_skipped() {
        let raw = r#"[{"name": "Dal"}, "oops", {"title": "no name"}, {"name": "Rice"}]"#;
        let names: Vec<String> = normalize(raw).unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Dal", "Rice"]);
    }

    #[test]
    fn test_code_fence_stripped() {
        let raw = "```json\n[{\"name\": \"Poha\"}]\n```";
        assert_eq!(normalize(raw).unwrap()[0].name, "Poha");
    }

    #[test]
    fn test_instruction_steps_joined() {
        let raw = r#"[{"name": "Upma", "instructions": ["Roast rava", "Add water"]}]"#;
        assert_eq!(normalize(raw).unwrap()[0].instructions, "Roast rava\nAdd water");
    }
}
