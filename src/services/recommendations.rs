use std::sync::Arc;

use rand::{seq::SliceRandom, Rng};
use tracing::instrument;

use crate::{
    db::{CatalogError, CatalogQuery, RecipeCatalog},
    error::AppResult,
    models::{
        placeholder_image_url, slugify, DishRecommendation, DishRecord, MealType, UserProfile,
    },
    services::{
        catalog_filter::{self, total_minutes},
        completion::CompletionClient,
        normalizer::{self, ParseError},
        prompt,
    },
};

/// Every successful response carries exactly this many dishes
pub const RECOMMENDATION_COUNT: usize = 3;

const LOCAL_FALLBACK_REASON: &str =
    "A popular choice that matches your preferences. Our AI is currently busy, but we think you'll love this!";

const CATALOG_PICK_REASON: &str = "Another dish from our collection that fits your preferences.";

/// Generates personalised dish recommendations
///
/// Grounds the model in filtered catalog dishes when enough match the user's
/// profile, otherwise lets the model answer from its own knowledge. When the
/// model path fails and catalog candidates exist, a random pick of those
/// candidates is returned instead.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn RecipeCatalog>,
    completion: CompletionClient,
    fetch_limit: usize,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn RecipeCatalog>,
        completion: CompletionClient,
        fetch_limit: usize,
    ) -> Self {
        Self {
            catalog,
            completion,
            fetch_limit,
        }
    }

    /// Returns exactly 3 recommendations or an error
    #[instrument(skip(self, profile), fields(catalog = self.catalog.name()))]
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        meal_type: MealType,
    ) -> AppResult<Vec<DishRecommendation>> {
        let candidates = match self.catalog_candidates(profile, meal_type).await {
            Ok(dishes) => Some(dishes),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    catalog = self.catalog.name(),
                    "Catalog unavailable for this request, using knowledge-only prompt"
                );
                None
            }
        };

        let prompt = match &candidates {
            Some(dishes) => prompt::grounded(profile, meal_type, dishes),
            None => prompt::knowledge_only(profile, meal_type),
        };

        let outcome: AppResult<Vec<DishRecommendation>> =
            match self.completion.complete(&prompt).await {
                Ok(raw) => normalizer::normalize(&raw)
                    .and_then(|recs| {
                        finalize(recs, candidates.as_deref(), meal_type, &mut rand::rng())
                    })
                    .map_err(Into::into),
                Err(e) => Err(e.into()),
            };

        match (outcome, candidates) {
            (Ok(recommendations), _) => {
                tracing::info!(
                    meal_type = %meal_type,
                    count = recommendations.len(),
                    "Recommendations generated by model"
                );
                Ok(recommendations)
            }
            (Err(e), Some(dishes)) => {
                tracing::error!(
                    error = %e,
                    candidates = dishes.len(),
                    "Model path failed, serving local catalog fallback"
                );
                Ok(local_fallback(&dishes, meal_type, &mut rand::rng()))
            }
            (Err(e), None) => {
                tracing::error!(error = %e, "Model path failed with no catalog fallback");
                Err(e)
            }
        }
    }

    /// Fetches the catalog and filters it against the profile.
    ///
    /// Fewer than 3 survivors cannot fill a response on their own, so that case
    /// is treated like an empty catalog.
    async fn catalog_candidates(
        &self,
        profile: &UserProfile,
        meal_type: MealType,
    ) -> Result<Vec<DishRecord>, CatalogError> {
        let mut query = CatalogQuery::new(self.fetch_limit);
        if profile.is_vegetarian() {
            query = query.with_diet("Vegetarian");
        }

        let dishes = self.catalog.fetch(&query).await?;
        if dishes.is_empty() {
            return Err(CatalogError::Empty);
        }

        let filtered = catalog_filter::filter(&dishes, profile, meal_type);
        tracing::info!(
            fetched = dishes.len(),
            matched = filtered.len(),
            meal_type = %meal_type,
            "Catalog filtered"
        );

        if filtered.len() < RECOMMENDATION_COUNT {
            tracing::warn!(matched = filtered.len(), "Too few catalog dishes matched the profile");
            return Err(CatalogError::InsufficientMatches(filtered.len()));
        }

        Ok(filtered)
    }
}

/// Brings model output to exactly 3 dishes.
///
/// Extra dishes are dropped. A grounded answer that is short is topped up
/// from the shuffled candidates; a knowledge-only answer that is short is an
/// error. Knowledge-only dishes always get the placeholder image.
fn finalize<R: Rng + ?Sized>(
    mut recommendations: Vec<DishRecommendation>,
    candidates: Option<&[DishRecord]>,
    meal_type: MealType,
    rng: &mut R,
) -> Result<Vec<DishRecommendation>, ParseError> {
    if recommendations.len() != RECOMMENDATION_COUNT {
        tracing::warn!(
            returned = recommendations.len(),
            "Model returned an unexpected number of recommendations"
        );
    }
    recommendations.truncate(RECOMMENDATION_COUNT);

    match candidates {
        Some(dishes) => {
            if recommendations.len() < RECOMMENDATION_COUNT {
                let mut pool: Vec<&DishRecord> = dishes.iter().collect();
                pool.shuffle(rng);

                for dish in pool {
                    if recommendations.len() == RECOMMENDATION_COUNT {
                        break;
                    }
                    let taken = recommendations
                        .iter()
                        .any(|r| r.name.eq_ignore_ascii_case(&dish.name));
                    if !taken {
                        recommendations.push(from_record(dish, meal_type, CATALOG_PICK_REASON));
                    }
                }
            }
        }
        None => {
            for rec in recommendations.iter_mut() {
                rec.image_url = placeholder_image_url(&rec.name);
            }
        }
    }

    if recommendations.len() != RECOMMENDATION_COUNT {
        return Err(ParseError::WrongCount(recommendations.len()));
    }
    Ok(recommendations)
}

/// Uniformly random pick of 3 catalog dishes, used when the model path fails
pub fn local_fallback<R: Rng + ?Sized>(
    dishes: &[DishRecord],
    meal_type: MealType,
    rng: &mut R,
) -> Vec<DishRecommendation> {
    let mut pool: Vec<&DishRecord> = dishes.iter().collect();
    pool.shuffle(rng);
    pool.into_iter()
        .take(RECOMMENDATION_COUNT)
        .map(|dish| from_record(dish, meal_type, LOCAL_FALLBACK_REASON))
        .collect()
}

/// Maps a catalog record straight into the response shape
fn from_record(dish: &DishRecord, meal_type: MealType, reason: &str) -> DishRecommendation {
    let minutes = total_minutes(dish);
    let cooking_time = if minutes > 0 {
        format!("{} mins", minutes)
    } else {
        "Time not specified".to_string()
    };

    DishRecommendation {
        id: slugify(&dish.name),
        name: dish.name.clone(),
        cuisine: dish.cuisine.clone().unwrap_or_default(),
        meal_type: meal_type.as_str().to_string(),
        cooking_time,
        spice_level: "medium".to_string(),
        difficulty: "easy".to_string(),
        rating: 4.3,
        description: dish.description.clone().unwrap_or_default(),
        ingredients: dish
            .ingredients
            .as_ref()
            .map(|i| i.to_list())
            .unwrap_or_default(),
        instructions: dish.instructions.clone().unwrap_or_default(),
        reason: reason.to_string(),
        image_url: dish
            .image_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| placeholder_image_url(&dish.name)),
    }
}
