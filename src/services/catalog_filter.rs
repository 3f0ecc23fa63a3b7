use crate::{
    models::{DishRecord, MealType, UserProfile},
    services::time_parser::{self, Minutes},
};

/// Ingredients that rule a vegetarian-tagged dish out for vegans.
/// The catalog has no vegan tag, so this keyword check is a best-effort proxy.
const NON_VEGAN_MARKERS: [&str; 2] = ["ghee", "yogurt"];

/// Reduces catalog dishes to those matching the meal type, the user's time
/// budget, dietary restrictions and allergies.
pub fn filter(dishes: &[DishRecord], profile: &UserProfile, meal_type: MealType) -> Vec<DishRecord> {
    let max_minutes = profile.cooking_time.max_minutes();
    let restrictions: Vec<String> = profile.restrictions().collect();
    let allergens = profile.allergens();

    dishes
        .iter()
        .filter(|dish| {
            matches_meal_type(dish, meal_type)
                && matches_time(dish, max_minutes)
                && matches_diet(dish, &restrictions)
                && matches_allergies(dish, &allergens)
        })
        .cloned()
        .collect()
}

/// Catalog course labels are inconsistent, so a few synonyms are accepted
fn matches_meal_type(dish: &DishRecord, meal_type: MealType) -> bool {
    let Some(course) = dish.course.as_deref() else {
        return false;
    };
    let course = course.to_lowercase();

    if course.contains(&meal_type.as_str().to_lowercase()) {
        return true;
    }

    match meal_type {
        MealType::Lunch | MealType::Dinner => course.contains("main course"),
        MealType::Snacks => course.contains("snack") || course.contains("appetizer"),
        MealType::Breakfast => false,
    }
}

/// Combined prep + cook time in minutes; unknown legs count as 0
pub fn total_minutes(dish: &DishRecord) -> u32 {
    let leg = |value: &Option<String>| {
        value
            .as_deref()
            .map(time_parser::parse)
            .unwrap_or(Minutes::Unbounded)
            .or_zero()
    };
    leg(&dish.prep_time).saturating_add(leg(&dish.cook_time))
}

fn matches_time(dish: &DishRecord, max_minutes: Minutes) -> bool {
    match max_minutes {
        Minutes::Unbounded => true,
        Minutes::Bounded(max) => {
            let total = total_minutes(dish);
            total == 0 || total <= max
        }
    }
}

fn matches_diet(dish: &DishRecord, restrictions: &[String]) -> bool {
    restrictions.iter().all(|restriction| match restriction.as_str() {
        "vegan" => {
            let ingredients = dish.ingredient_text();
            dish.has_diet("vegetarian")
                && !NON_VEGAN_MARKERS
                    .iter()
                    .any(|marker| ingredients.contains(marker))
        }
        "vegetarian" => dish.has_diet("vegetarian"),
        _ => true,
    })
}

fn matches_allergies(dish: &DishRecord, allergens: &[String]) -> bool {
    if allergens.is_empty() {
        return true;
    }
    let ingredients = dish.ingredient_text();
    !allergens
        .iter()
        .any(|allergen| ingredients.contains(allergen.as_str()))
}
