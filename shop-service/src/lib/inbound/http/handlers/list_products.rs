use axum::extract::Query;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use crate::catalog::models::ListingParams;
use crate::catalog::models::ListingQuery;
use crate::catalog::models::ProductPage;
use crate::inbound::http::router::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductsQueryParams>,
) -> Result<Json<ProductPage>, ApiError> {
    let query = ListingQuery::from_params(params.as_listing_params());

    let page = state.catalog_service.list_products(query).await?;

    Ok(Json(page))
}

/// Raw query string. Everything is kept as text so malformed numbers fall
/// back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQueryParams {
    limit: Option<String>,
    skip: Option<String>,
    search: Option<String>,
    category: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
    price_min: Option<String>,
    price_max: Option<String>,
}

impl ProductsQueryParams {
    fn as_listing_params(&self) -> ListingParams<'_> {
        ListingParams {
            limit: self.limit.as_deref(),
            skip: self.skip.as_deref(),
            search: self.search.as_deref(),
            category: self.category.as_deref(),
            sort_by: self.sort_by.as_deref(),
            sort_order: self.sort_order.as_deref(),
            price_min: self.price_min.as_deref(),
            price_max: self.price_max.as_deref(),
        }
    }
}
