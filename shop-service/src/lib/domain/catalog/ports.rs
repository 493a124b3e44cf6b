use async_trait::async_trait;

use crate::domain::catalog::errors::CatalogError;
use crate::domain::catalog::models::ListingQuery;
use crate::domain::catalog::models::ProductPage;
use crate::domain::catalog::models::UpstreamQuery;

/// Port for catalog browsing.
#[async_trait]
pub trait CatalogServicePort: Send + Sync + 'static {
    /// Fetch one page of products, applying the price filter locally.
    ///
    /// # Errors
    /// * Any `CatalogError` - Upstream transport, status or decode failure
    async fn list_products(&self, query: ListingQuery) -> Result<ProductPage, CatalogError>;

    /// Fetch the upstream category names.
    async fn list_categories(&self) -> Result<Vec<String>, CatalogError>;
}

/// Upstream catalog API. One attempt per call, no retries.
#[async_trait]
pub trait CatalogGateway: Send + Sync + 'static {
    async fn fetch_products(&self, query: &UpstreamQuery) -> Result<ProductPage, CatalogError>;

    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError>;
}
