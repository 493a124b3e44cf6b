use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::catalog::errors::CatalogError;
use crate::domain::catalog::models::ListingQuery;
use crate::domain::catalog::models::ProductPage;
use crate::domain::catalog::ports::CatalogGateway;
use crate::domain::catalog::ports::CatalogServicePort;

/// Catalog query translator: listing query in, normalised page out.
pub struct CatalogService<G>
where
    G: CatalogGateway,
{
    gateway: Arc<G>,
}

impl<G> CatalogService<G>
where
    G: CatalogGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G> CatalogServicePort for CatalogService<G>
where
    G: CatalogGateway,
{
    async fn list_products(&self, query: ListingQuery) -> Result<ProductPage, CatalogError> {
        let upstream_query = query.upstream_query();
        tracing::debug!(
            route = ?upstream_query.route,
            limit = upstream_query.limit,
            skip = upstream_query.skip,
            "Fetching products"
        );

        let mut page = self.gateway.fetch_products(&upstream_query).await?;
        page.retain_price_range(&query.price_range);

        Ok(page)
    }

    async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.gateway.fetch_categories().await
    }
}
