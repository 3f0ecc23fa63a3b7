use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{DishRecommendation, MealType, UserProfile},
    services::chef_chat::{self, ChatTurn},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub user_profile: UserProfile,
    /// Derived from the server clock when omitted
    #[serde(default)]
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Deserialize)]
pub struct ChefChatRequest {
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChefChatResponse {
    pub response: String,
}

/// Unwraps a JSON body, reporting malformed input as 400 with the usual error shape
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

// Handlers

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Recommend exactly 3 dishes for the user and meal
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<Vec<DishRecommendation>>> {
    let request = json_body(payload)?;
    let meal_type = request.meal_type.unwrap_or_else(MealType::now);

    tracing::info!(
        request_id = %request_id,
        meal_type = %meal_type,
        restrictions = request.user_profile.dietary_restrictions.len(),
        cooking_time = ?request.user_profile.cooking_time,
        "Processing recommendation request"
    );

    let recommendations = state
        .engine
        .recommend(&request.user_profile, meal_type)
        .await
        .inspect_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Recommendation request failed")
        })?;

    tracing::info!(request_id = %request_id, "Recommendations completed");

    Ok(Json(recommendations))
}

/// Answer a cooking question in the chef persona
pub async fn chef_chat(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ChefChatRequest>, JsonRejection>,
) -> AppResult<Json<ChefChatResponse>> {
    let request = json_body(payload)?;

    tracing::info!(
        request_id = %request_id,
        turns = request.history.len(),
        "Processing chef chat request"
    );

    let response = chef_chat::reply(&state.chat, &request.history).await?;
    Ok(Json(ChefChatResponse { response }))
}
