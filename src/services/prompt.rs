use crate::models::{placeholder_image_url, DishRecord, MealType, UserProfile};

/// Candidate dishes embedded in a grounded prompt, bounding model context size
pub const MAX_PROMPT_DISHES: usize = 30;

/// Keys every dish object in the model's answer must carry
pub const RECOMMENDATION_KEYS: [&str; 13] = [
    "id",
    "name",
    "cuisine",
    "mealType",
    "cookingTime",
    "spiceLevel",
    "difficulty",
    "rating",
    "description",
    "ingredients",
    "instructions",
    "reason",
    "image_url",
];

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        "Not specified"
    } else {
        value
    }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}

fn profile_section(profile: &UserProfile, meal_type: MealType) -> String {
    format!(
        "USER PROFILE:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Born in: {birth_place}\n\
         - Currently living in: {location}\n\
         - Favorite Cuisines: {cuisines}\n\
         - Dietary Restrictions: {restrictions}\n\
         - Spice Tolerance: {spice}\n\
         - Cooking Time Available: {cooking_time}\n\
         - Cooking For: {family_size}\n\
         - Allergies: {allergies}\n\
         - Additional Preferences: {additional}\n\
         - Meal Type: {meal_type}\n",
        name = or_unspecified(&profile.name),
        age = or_unspecified(&profile.age),
        birth_place = or_unspecified(&profile.birth_place),
        location = or_unspecified(&profile.current_location),
        cuisines = join_or_none(&profile.favorite_cuisines),
        restrictions = join_or_none(&profile.dietary_restrictions),
        spice = profile.spice_level,
        cooking_time = profile.cooking_time,
        family_size = or_unspecified(&profile.family_size),
        allergies = or_unspecified(&profile.allergies),
        additional = or_unspecified(&profile.additional_preferences),
        meal_type = meal_type,
    )
}

fn output_contract(meal_type: MealType, image_rule: &str) -> String {
    let keys = RECOMMENDATION_KEYS
        .iter()
        .map(|k| format!("\"{}\"", k))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Respond ONLY with a valid JSON object of the shape {{ \"recommendations\": [ ... ] }} \
         holding exactly 3 dish objects. Each dish object must have exactly these keys: {keys}.\n\
         - \"mealType\" must be \"{meal_type}\".\n\
         - \"ingredients\" must be an array of strings.\n\
         - \"rating\" must be a number between 1 and 5.\n\
         - \"spiceLevel\" and \"difficulty\" must each be one short word.\n\
         - \"reason\" must explain in one or two sentences why this dish suits this user, \
         referring to their profile (cuisines, spice tolerance, cooking time, where they are from).\n\
         - {image_rule}\n",
    )
}

/// Prompt asking the model to choose 3 dishes from real catalog records
pub fn grounded(profile: &UserProfile, meal_type: MealType, dishes: &[DishRecord]) -> String {
    let shown = &dishes[..dishes.len().min(MAX_PROMPT_DISHES)];
    let catalog = serde_json::to_string_pretty(shown).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are MyDishGenie, an expert Indian cuisine recommendation AI. \
         Analyze the user profile and recommend exactly 3 dishes from the candidate list below.\n\n\
         {profile}\n\
         CANDIDATE DISHES ({count}):\n{catalog}\n\n\
         Choose exactly 3 dishes from the candidate list. Keep their names, cuisines, ingredients, \
         instructions and image URLs as given.\n\
         {contract}",
        profile = profile_section(profile, meal_type),
        count = shown.len(),
        catalog = catalog,
        contract = output_contract(
            meal_type,
            "\"image_url\" must be copied from the candidate's image_url.",
        ),
    )
}

/// Prompt asking the model to invent 3 dishes when no catalog candidates exist
pub fn knowledge_only(profile: &UserProfile, meal_type: MealType) -> String {
    let placeholder = placeholder_image_url("Dish Name");

    format!(
        "You are MyDishGenie, an expert Indian cuisine recommendation AI. \
         Using your own culinary knowledge, recommend exactly 3 dishes for this user.\n\n\
         {profile}\n\
         Respect every dietary restriction and allergy strictly. Suggest realistic home-cooked \
         dishes that fit the cooking time available.\n\
         {contract}",
        profile = profile_section(profile, meal_type),
        contract = output_contract(
            meal_type,
            &format!(
                "\"image_url\" must be a placeholder of the form \"{}\" with the dish name in place of Dish+Name.",
                placeholder
            ),
        ),
    )
}
