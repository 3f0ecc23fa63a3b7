use std::fmt::Display;

use chrono::{Local, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

use crate::services::time_parser::Minutes;

/// How much heat the user tolerates
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SpiceLevel {
    Mild,
    #[default]
    Medium,
    Hot,
    ExtraHot,
}

impl Display for SpiceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SpiceLevel::Mild => "mild",
            SpiceLevel::Medium => "medium",
            SpiceLevel::Hot => "hot",
            SpiceLevel::ExtraHot => "extra-hot",
        };
        write!(f, "{}", label)
    }
}

/// Time the user is willing to spend cooking
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CookingTime {
    Quick,
    Moderate,
    Elaborate,
    #[default]
    Any,
}

impl CookingTime {
    /// Maximum combined prep + cook time allowed by this preference
    pub fn max_minutes(self) -> Minutes {
        match self {
            CookingTime::Quick => Minutes::Bounded(30),
            CookingTime::Moderate => Minutes::Bounded(60),
            CookingTime::Elaborate | CookingTime::Any => Minutes::Unbounded,
        }
    }
}

impl Display for CookingTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CookingTime::Quick => "quick (15-30 minutes)",
            CookingTime::Moderate => "moderate (30-60 minutes)",
            CookingTime::Elaborate => "elaborate (1+ hours)",
            CookingTime::Any => "any (flexible)",
        };
        write!(f, "{}", label)
    }
}

/// Meal slot a recommendation is made for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MealType {
    #[serde(alias = "breakfast")]
    Breakfast,
    #[serde(alias = "lunch")]
    Lunch,
    #[serde(alias = "snacks", alias = "Snack", alias = "snack")]
    Snacks,
    #[serde(alias = "dinner")]
    Dinner,
}

impl MealType {
    /// Breakfast [6,11), Lunch [11,16), Snacks [16,20), Dinner otherwise
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=10 => MealType::Breakfast,
            11..=15 => MealType::Lunch,
            16..=19 => MealType::Snacks,
            _ => MealType::Dinner,
        }
    }

    /// Meal type for the server's local wall-clock time
    pub fn now() -> Self {
        Self::from_hour(Local::now().hour())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Snacks => "Snacks",
            MealType::Dinner => "Dinner",
        }
    }
}

impl Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Preferences gathered during onboarding, sent with every recommendation request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub birth_place: String,
    pub current_location: String,
    /// The dashboard sends age as a string, older clients as a number
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
    pub favorite_cuisines: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub spice_level: SpiceLevel,
    pub cooking_time: CookingTime,
    pub family_size: String,
    /// Comma-separated free text
    pub allergies: String,
    pub additional_preferences: String,
}

impl UserProfile {
    /// Lower-cased, trimmed dietary restrictions
    pub fn restrictions(&self) -> impl Iterator<Item = String> + '_ {
        self.dietary_restrictions
            .iter()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
    }

    /// Lower-cased allergens parsed from the comma-separated allergies field
    pub fn allergens(&self) -> Vec<String> {
        self.allergies
            .split(',')
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// True when any restriction implies a vegetarian-only catalog
    pub fn is_vegetarian(&self) -> bool {
        self.restrictions()
            .any(|r| r == "vegetarian" || r == "vegan")
    }
}

/// Accepts a JSON string, number, or null and yields a string
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string_or_number(deserializer)?.unwrap_or_default())
}

pub(crate) fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_meal_type_boundaries() {
        assert_eq!(MealType::from_hour(5), MealType::Dinner);
        assert_eq!(MealType::from_hour(6), MealType::Breakfast);
        assert_eq!(MealType::from_hour(10), MealType::Breakfast);
        assert_eq!(MealType::from_hour(11), MealType::Lunch);
        assert_eq!(MealType::from_hour(15), MealType::Lunch);
        assert_eq!(MealType::from_hour(16), MealType::Snacks);
        assert_eq!(MealType::from_hour(19), MealType::Snacks);
        assert_eq!(MealType::from_hour(20), MealType::Dinner);
        assert_eq!(MealType::from_hour(0), MealType::Dinner);
    }

    #[test]
    fn test_meal_type_deserialization() {
        let meal: MealType = serde_json::from_str("\"Lunch\"").unwrap();
        assert_eq!(meal, MealType::Lunch);
        let meal: MealType = serde_json::from_str("\"snacks\"").unwrap();
        assert_eq!(meal, MealType::Snacks);
        assert!(serde_json::from_str::<MealType>("\"Brunch\"").is_err());
    }

    #[test]
    fn test_profile_deserialization() {
        let profile: UserProfile = serde_json::from_value(json!({
            "name": "Asha",
            "birthPlace": "Kerala",
            "age": "34",
            "favoriteCuisines": ["South Indian", "Punjabi"],
            "dietaryRestrictions": ["Vegetarian"],
            "spiceLevel": "extra-hot",
            "cookingTime": "quick",
            "allergies": "peanut, , Cashew "
        }))
        .unwrap();

        assert_eq!(profile.age, "34");
        assert_eq!(profile.spice_level, SpiceLevel::ExtraHot);
        assert_eq!(profile.cooking_time, CookingTime::Quick);
        assert_eq!(profile.allergens(), vec!["peanut", "cashew"]);
        assert!(profile.is_vegetarian());
        assert_eq!(profile.family_size, "");
    }

    #[test]
    fn test_numeric_age_accepted() {
        let profile: UserProfile = serde_json::from_value(json!({ "age": 41 })).unwrap();
        assert_eq!(profile.age, "41");
    }

    #[test]
    fn test_unknown_cooking_time_rejected() {
        let result = serde_json::from_value::<UserProfile>(json!({ "cookingTime": "forever" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_cooking_time_limits() {
        assert_eq!(CookingTime::Quick.max_minutes(), Minutes::Bounded(30));
        assert_eq!(CookingTime::Moderate.max_minutes(), Minutes::Bounded(60));
        assert_eq!(CookingTime::Elaborate.max_minutes(), Minutes::Unbounded);
        assert_eq!(CookingTime::Any.max_minutes(), Minutes::Unbounded);
    }
}
