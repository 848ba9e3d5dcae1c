//! Vitrin Core - storefront data layer
//!
//! The client-side core of the Vitrin storefront: fetches the remote
//! product catalog, drives the search/filter/sort/paginate listing, and
//! persists cart and favorites locally with change notification.
//!
//! # Module Structure
//!
//! ```text
//! vitrin-core/src/
//! ├── core/        # Configuration
//! ├── catalog/     # Remote catalog client (reqwest)
//! ├── store/       # Persisted cart/favorites store (redb)
//! ├── listing/     # Listing engine: filter, search, sort, paginate
//! ├── viewmodels/  # Reactive projections over the store
//! └── utils/       # Logging setup
//! ```
//!
//! # Data Flow
//!
//! Catalog → `ProductListing` (full set) → filter/search/sort → paginated
//! window → consumer. Independently: mutation on `ProductStore` → broadcast
//! notification → view-models reload → consumer.

pub mod catalog;
pub mod core;
pub mod listing;
pub mod store;
pub mod utils;
pub mod viewmodels;

// Re-export public types
pub use catalog::{FetchError, HttpCatalog, ProductCatalog};
pub use self::core::Config;
pub use listing::{ListingEvent, ProductListing};
pub use store::{ProductStore, StoreError};
pub use viewmodels::{CartViewModel, FavoriteViewModel, ProductDetailViewModel};

// Re-export shared models for convenience
pub use shared::models::{CartRecord, FavoriteRecord, FilterOptions, Product, SortType};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_level};
