//! Product detail view-model

use crate::store::ProductStore;
use shared::models::Product;

/// Actions available on a single product's detail screen
#[derive(Debug)]
pub struct ProductDetailViewModel {
    store: ProductStore,
    product: Product,
}

impl ProductDetailViewModel {
    pub fn new(store: ProductStore, product: Product) -> Self {
        Self { store, product }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Add one unit of this product to the cart
    pub fn add_to_cart(&self) {
        self.store.add_to_cart(&self.product, 1);
    }

    /// Flip the favorite state; returns the new state
    pub fn toggle_favorite(&self) -> bool {
        if self.is_favorite() {
            self.store.remove_from_favorites(&self.product.id);
            false
        } else {
            self.store.add_to_favorites(&self.product);
            true
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.store.is_favorite(&self.product.id)
    }
}
