use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use crate::inbound::http::router::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state.catalog_service.list_categories().await?;

    Ok(Json(CategoriesResponse { categories }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}
