//! redb-based persisted store for cart and favorites
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `cart_items` | `product_id` | `CartRecord` | Cart lines |
//! | `favorite_items` | `product_id` | `FavoriteRecord` | Favorites |
//!
//! Values are JSON-serialized records; at most one record per product id in
//! either table. Every mutation is a single write transaction (redb
//! serializes writers), so the read-check-then-write sequences are safe for
//! concurrent callers.
//!
//! # Change Notification
//!
//! Two independent broadcast topics, one per table. Subscribers get a unit
//! payload and re-query state. Emission matches the caller-visible contract:
//! removals notify even when nothing matched, the idempotent duplicate path
//! of `add_to_favorites` stays silent, and quantity updates notify only when
//! a record matched.
//!
//! # Durability
//!
//! Mutations are best-effort from the caller's perspective: a failed write
//! is logged and swallowed, never raised, and emits no notification. Reads
//! fall back to empty/false on error.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::{CartRecord, FavoriteRecord, Product};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Table for cart lines: key = product_id, value = JSON-serialized CartRecord
const CART_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("cart_items");

/// Table for favorites: key = product_id, value = JSON-serialized FavoriteRecord
const FAVORITES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("favorite_items");

/// Broadcast channel capacity per topic
const CHANNEL_CAPACITY: usize = 64;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted cart/favorites store backed by redb
#[derive(Clone)]
pub struct ProductStore {
    db: Arc<Database>,
    cart_tx: broadcast::Sender<()>,
    favorites_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore").finish_non_exhaustive()
    }
}

impl ProductStore {
    /// Open or create the database at the given path
    ///
    /// Failure here is a process-start precondition; everything after a
    /// successful open is best-effort.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        Self::with_database(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::with_database(db)
    }

    fn with_database(db: Database) -> StoreResult<Self> {
        // Create tables up front so first reads see them
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CART_TABLE)?;
            let _ = write_txn.open_table(FAVORITES_TABLE)?;
        }
        write_txn.commit()?;

        let (cart_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (favorites_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Ok(Self {
            db: Arc::new(db),
            cart_tx,
            favorites_tx,
        })
    }

    /// Subscribe to the cart-changed topic
    pub fn subscribe_cart(&self) -> broadcast::Receiver<()> {
        self.cart_tx.subscribe()
    }

    /// Subscribe to the favorites-changed topic
    pub fn subscribe_favorites(&self) -> broadcast::Receiver<()> {
        self.favorites_tx.subscribe()
    }

    fn notify_cart(&self) {
        let _ = self.cart_tx.send(());
    }

    fn notify_favorites(&self) {
        let _ = self.favorites_tx.send(());
    }

    // ========== Cart Operations ==========

    /// Add a product to the cart, creating a record or incrementing the
    /// existing one
    pub fn add_to_cart(&self, product: &Product, quantity: i64) {
        match self.try_add_to_cart(product, quantity) {
            Ok(()) => self.notify_cart(),
            Err(e) => {
                tracing::error!(product_id = %product.id, error = %e, "Failed to add to cart")
            }
        }
    }

    fn try_add_to_cart(&self, product: &Product, quantity: i64) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CART_TABLE)?;
            let existing = match table.get(product.id.as_str())? {
                Some(value) => Some(serde_json::from_slice::<CartRecord>(value.value())?),
                None => None,
            };

            let record = match existing {
                Some(mut record) => {
                    record.quantity += quantity;
                    record
                }
                None => CartRecord::snapshot(product, quantity),
            };

            let value = serde_json::to_vec(&record)?;
            table.insert(product.id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Remove a product from the cart; no-op when absent
    pub fn remove_from_cart(&self, product_id: &str) {
        match self.try_remove(CART_TABLE, product_id) {
            Ok(_) => self.notify_cart(),
            Err(e) => {
                tracing::error!(product_id = %product_id, error = %e, "Failed to remove from cart")
            }
        }
    }

    /// Set the quantity of an existing cart line
    ///
    /// Quantities of zero or below delete the record. Absent records are a
    /// silent no-op with no notification.
    pub fn update_cart_item_quantity(&self, product_id: &str, quantity: i64) {
        match self.try_update_cart_item_quantity(product_id, quantity) {
            Ok(true) => self.notify_cart(),
            Ok(false) => {}
            Err(e) => {
                tracing::error!(product_id = %product_id, error = %e, "Failed to update cart item")
            }
        }
    }

    /// Returns whether a record matched
    fn try_update_cart_item_quantity(&self, product_id: &str, quantity: i64) -> StoreResult<bool> {
        let txn = self.db.begin_write()?;
        let matched = {
            let mut table = txn.open_table(CART_TABLE)?;
            let existing = match table.get(product_id)? {
                Some(value) => Some(serde_json::from_slice::<CartRecord>(value.value())?),
                None => None,
            };

            match existing {
                Some(mut record) => {
                    if quantity <= 0 {
                        table.remove(product_id)?;
                    } else {
                        record.quantity = quantity;
                        let value = serde_json::to_vec(&record)?;
                        table.insert(product_id, value.as_slice())?;
                    }
                    true
                }
                None => false,
            }
        };
        txn.commit()?;
        Ok(matched)
    }

    /// All cart records, ordered by product id (storage order)
    pub fn fetch_cart_items(&self) -> Vec<CartRecord> {
        self.try_fetch_all(CART_TABLE).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch cart items");
            Vec::new()
        })
    }

    /// Sum of all cart quantities
    pub fn cart_item_count(&self) -> i64 {
        self.fetch_cart_items().iter().map(|r| r.quantity).sum()
    }

    // ========== Favorite Operations ==========

    /// Add a product to favorites; the duplicate path is a silent no-op
    pub fn add_to_favorites(&self, product: &Product) {
        match self.try_add_to_favorites(product) {
            Ok(true) => self.notify_favorites(),
            Ok(false) => {}
            Err(e) => {
                tracing::error!(product_id = %product.id, error = %e, "Failed to add to favorites")
            }
        }
    }

    /// Returns whether a record was inserted
    fn try_add_to_favorites(&self, product: &Product) -> StoreResult<bool> {
        let txn = self.db.begin_write()?;
        let inserted = {
            let mut table = txn.open_table(FAVORITES_TABLE)?;
            if table.get(product.id.as_str())?.is_some() {
                false
            } else {
                let record = FavoriteRecord::snapshot(product);
                let value = serde_json::to_vec(&record)?;
                table.insert(product.id.as_str(), value.as_slice())?;
                true
            }
        };
        txn.commit()?;
        Ok(inserted)
    }

    /// Remove a product from favorites; no-op when absent
    pub fn remove_from_favorites(&self, product_id: &str) {
        match self.try_remove(FAVORITES_TABLE, product_id) {
            Ok(_) => self.notify_favorites(),
            Err(e) => {
                tracing::error!(product_id = %product_id, error = %e, "Failed to remove from favorites")
            }
        }
    }

    /// Whether a favorite record exists for this product id
    pub fn is_favorite(&self, product_id: &str) -> bool {
        self.try_is_favorite(product_id).unwrap_or_else(|e| {
            tracing::error!(product_id = %product_id, error = %e, "Failed to check favorite status");
            false
        })
    }

    fn try_is_favorite(&self, product_id: &str) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FAVORITES_TABLE)?;
        Ok(table.get(product_id)?.is_some())
    }

    /// All favorite records, ordered by product id (storage order)
    pub fn fetch_favorite_items(&self) -> Vec<FavoriteRecord> {
        self.try_fetch_all(FAVORITES_TABLE).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch favorite items");
            Vec::new()
        })
    }

    // ========== Shared Helpers ==========

    /// Returns whether a record was removed
    fn try_remove(
        &self,
        table_def: TableDefinition<'static, &'static str, &'static [u8]>,
        product_id: &str,
    ) -> StoreResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(table_def)?;
            table.remove(product_id)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    fn try_fetch_all<T: serde::de::DeserializeOwned>(
        &self,
        table_def: TableDefinition<'static, &'static str, &'static [u8]>,
    ) -> StoreResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }
}
