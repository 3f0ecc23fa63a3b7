pub mod dish;
pub mod profile;

pub use dish::{
    placeholder_image_url, slugify, split_list, DishRecommendation, DishRecord, Ingredients,
};
pub use profile::{CookingTime, MealType, SpiceLevel, UserProfile};
