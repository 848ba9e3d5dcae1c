//! HTTP catalog client

use super::{FetchError, FetchResult, PRODUCTS_PATH, ProductCatalog};
use crate::core::Config;
use async_trait::async_trait;
use reqwest::Client;
use shared::models::Product;
use std::time::Duration;

/// Catalog client backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    /// Create a new catalog client from configuration
    pub fn new(config: &Config) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.catalog_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn products_url(&self) -> String {
        format!("{}/{}", self.base_url, PRODUCTS_PATH)
    }
}

#[async_trait]
impl ProductCatalog for HttpCatalog {
    async fn fetch_products(&self) -> FetchResult<Vec<Product>> {
        let url =
            reqwest::Url::parse(&self.products_url()).map_err(|_| FetchError::InvalidEndpoint)?;

        tracing::debug!(url = %url, "Fetching product catalog");
        let response = self.client.get(url).send().await?;
        let body = response.bytes().await?;

        if body.is_empty() {
            return Err(FetchError::NoData);
        }

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(error = %e, "Catalog payload failed to decode");
            FetchError::Decode
        })
    }
}
