use axum::{Json, Router, extract::State, routing::post};

use crate::{
    error::AppResult,
    response::ApiResponse,
    services::dataset_service::{self, SAMPLE_DATA_PATH},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/load", post(load_data))
        .route("/clear", post(clear_data))
}

#[utoipa::path(
    post,
    path = "/api/db/load",
    responses(
        (status = 200, description = "Sample data loaded"),
        (status = 400, description = "Sample data file missing or malformed"),
    ),
    tag = "Database"
)]
pub async fn load_data(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = dataset_service::load_sample_data(&state, SAMPLE_DATA_PATH).await?;

    if let Err(err) = state.cache.clear_all().await {
        tracing::warn!(error = %err, "cache invalidation failed");
    }
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/db/clear",
    responses(
        (status = 200, description = "All data rows cleared; schema kept"),
    ),
    tag = "Database"
)]
pub async fn clear_data(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = dataset_service::clear_data(&state).await?;

    if let Err(err) = state.cache.clear_all().await {
        tracing::warn!(error = %err, "cache invalidation failed");
    }
    Ok(Json(resp))
}
