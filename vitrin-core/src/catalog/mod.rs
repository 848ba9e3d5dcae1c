//! Remote catalog client
//!
//! The catalog is a single list-products endpoint returning the entire
//! product set in one JSON array; there is no server-side pagination, auth
//! or query protocol. The client sits behind the [`ProductCatalog`] trait so
//! tests can substitute canned responses without network I/O.

pub mod error;
pub mod http;

pub use error::{FetchError, FetchResult};
pub use http::HttpCatalog;

use async_trait::async_trait;
use shared::models::Product;

/// Default catalog base URL
pub const DEFAULT_BASE_URL: &str = "https://5fc9346b2af77700165ae514.mockapi.io";

/// Path of the list-products endpoint, relative to the base URL
pub const PRODUCTS_PATH: &str = "products";

/// Source of the full product catalog
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch the entire product list
    async fn fetch_products(&self) -> FetchResult<Vec<Product>>;
}
