use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::domain::catalog::errors::CatalogError;
use crate::domain::catalog::models::CatalogRoute;
use crate::domain::catalog::models::ProductPage;
use crate::domain::catalog::models::UpstreamQuery;
use crate::domain::catalog::ports::CatalogGateway;

/// Catalog gateway backed by the DummyJSON products API.
pub struct DummyJsonCatalog {
    client: Client,
    base_url: Url,
}

impl DummyJsonCatalog {
    /// `timeout` bounds each upstream call, body included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build the listing URL. Path segments are percent-encoded, so a
    /// category containing `/` or spaces stays a single segment.
    pub fn products_url(&self, query: &UpstreamQuery) -> Result<Url, CatalogError> {
        let mut url = match &query.route {
            CatalogRoute::Search(_) => self.endpoint(&["products", "search"])?,
            CatalogRoute::Category(category) => {
                self.endpoint(&["products", "category", category.as_str()])?
            }
            CatalogRoute::All => self.endpoint(&["products"])?,
        };

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("limit", &query.limit.to_string())
                .append_pair("skip", &query.skip.to_string());
            if let Some(sort) = &query.sort {
                pairs
                    .append_pair("sortBy", sort.field.as_str())
                    .append_pair("order", sort.order.as_str());
            }
            if let CatalogRoute::Search(term) = &query.route {
                pairs.append_pair("q", term);
            }
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        tracing::debug!(url = %url, "Calling product catalog");

        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout
    } else if err.is_decode() {
        CatalogError::Decode(err.to_string())
    } else {
        CatalogError::Request(err.to_string())
    }
}

#[async_trait]
impl CatalogGateway for DummyJsonCatalog {
    async fn fetch_products(&self, query: &UpstreamQuery) -> Result<ProductPage, CatalogError> {
        let url = self.products_url(query)?;
        self.get_json(url).await
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
        let url = self.endpoint(&["products", "category-list"])?;
        self.get_json(url).await
    }
}
