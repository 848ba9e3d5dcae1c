//! Shared types for the Vitrin storefront
//!
//! Model types used across the storefront crates: the remote catalog
//! product, listing filter options, and the locally persisted cart and
//! favorite records.

pub mod models;

// Re-exports
pub use models::{CartRecord, FavoriteRecord, FilterOptions, Product, SortType};
pub use serde::{Deserialize, Serialize};
