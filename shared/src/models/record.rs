//! Persisted cart and favorite records
//!
//! Both record kinds are keyed by product id and carry snapshot copies of
//! the product fields taken at insertion time. They are never re-joined to
//! the live catalog; a product that later changes upstream keeps its
//! snapshot here.

use super::Product;
use serde::{Deserialize, Serialize};

/// A cart line, at most one per product id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub product_price: String,
    pub product_brand: String,
    pub product_model: String,
    pub quantity: i64,
}

impl CartRecord {
    /// Snapshot a product into a new cart record
    pub fn snapshot(product: &Product, quantity: i64) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_image: product.image.clone(),
            product_price: product.price.clone(),
            product_brand: product.brand.clone(),
            product_model: product.model.clone(),
            quantity,
        }
    }
}

/// A favorite entry, at most one per product id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub product_price: String,
    pub product_brand: String,
    pub product_model: String,
}

impl FavoriteRecord {
    /// Snapshot a product into a new favorite record
    pub fn snapshot(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_image: product.image.clone(),
            product_price: product.price.clone(),
            product_brand: product.brand.clone(),
            product_model: product.model.clone(),
        }
    }

    /// Rebuild a transient product from the snapshot fields
    ///
    /// Description and creation timestamp are not snapshotted, so they come
    /// back empty.
    pub fn to_product(&self) -> Product {
        Product {
            id: self.product_id.clone(),
            name: self.product_name.clone(),
            image: self.product_image.clone(),
            price: self.product_price.clone(),
            description: String::new(),
            model: self.product_model.clone(),
            brand: self.product_brand.clone(),
            created_at: String::new(),
        }
    }
}
