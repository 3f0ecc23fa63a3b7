use serde::{Deserialize, Serialize};

use super::profile::optional_string_or_number;

/// Image shown for dishes that have no picture of their own
pub const PLACEHOLDER_IMAGE_BASE: &str = "https://placehold.co/600x400?text=";

/// Placeholder image URL labelled with the dish name
pub fn placeholder_image_url(name: &str) -> String {
    let label: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '+' })
        .collect();
    if label.is_empty() {
        format!("{}Dish", PLACEHOLDER_IMAGE_BASE)
    } else {
        format!("{}{}", PLACEHOLDER_IMAGE_BASE, label)
    }
}

/// URL-safe identifier derived from a dish name
pub fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Ingredient list as stored in the catalog: either a comma-joined string or an array
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Ingredients {
    List(Vec<String>),
    Text(String),
}

impl Ingredients {
    /// Lower-cased text used for keyword matching
    pub fn search_text(&self) -> String {
        match self {
            Ingredients::List(items) => items.join(", ").to_lowercase(),
            Ingredients::Text(text) => text.to_lowercase(),
        }
    }

    pub fn to_list(&self) -> Vec<String> {
        match self {
            Ingredients::List(items) => items.clone(),
            Ingredients::Text(text) => split_list(text),
        }
    }
}

/// Splits a comma-joined string, trimming entries and dropping blanks
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Recipe document from the external catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DishRecord {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub cuisine: Option<String>,
    /// Free-text course label, matched against the meal type
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub prep_time: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Ingredients>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl DishRecord {
    pub fn ingredient_text(&self) -> String {
        self.ingredients
            .as_ref()
            .map(Ingredients::search_text)
            .unwrap_or_default()
    }

    pub fn has_diet(&self, diet: &str) -> bool {
        self.diet
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case(diet))
    }
}

/// A single dish returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DishRecommendation {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub meal_type: String,
    pub cooking_time: String,
    pub spice_level: String,
    pub difficulty: String,
    pub rating: f64,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    /// Personalised justification written for this user
    pub reason: String,
    #[serde(rename = "image_url")]
    pub image_url: String,
}
