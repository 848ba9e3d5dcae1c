//! Data models

pub mod product;
pub mod record;

pub use product::{FilterOptions, Product, SortType};
pub use record::{CartRecord, FavoriteRecord};
