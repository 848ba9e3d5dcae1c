//! Favorites view-model

use super::CHANNEL_CAPACITY;
use crate::store::ProductStore;
use parking_lot::RwLock;
use shared::models::FavoriteRecord;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Reactive view over the favorites table
///
/// Must be created inside a Tokio runtime; the change listener runs as a
/// background task and is aborted on drop.
pub struct FavoriteViewModel {
    store: ProductStore,
    items: Arc<RwLock<Vec<FavoriteRecord>>>,
    update_tx: broadcast::Sender<()>,
    listener: JoinHandle<()>,
}

impl FavoriteViewModel {
    pub fn new(store: ProductStore) -> Self {
        let items = Arc::new(RwLock::new(store.fetch_favorite_items()));
        let (update_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let mut rx = store.subscribe_favorites();
        let listener = {
            let store = store.clone();
            let items = items.clone();
            let update_tx = update_tx.clone();
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            *items.write() = store.fetch_favorite_items();
                            let _ = update_tx.send(());
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            })
        };

        Self {
            store,
            items,
            update_tx,
            listener,
        }
    }

    /// Subscribe to the update signal; fired after every reload
    pub fn subscribe_updates(&self) -> broadcast::Receiver<()> {
        self.update_tx.subscribe()
    }

    /// Current favorite records
    pub fn items(&self) -> Vec<FavoriteRecord> {
        self.items.read().clone()
    }

    pub fn number_of_items(&self) -> usize {
        self.items.read().len()
    }

    pub fn item_at(&self, index: usize) -> Option<FavoriteRecord> {
        self.items.read().get(index).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Remove a favorite entry
    pub fn remove_from_favorites(&self, item: &FavoriteRecord) {
        self.store.remove_from_favorites(&item.product_id);
    }

    /// Move a favorite into the cart
    ///
    /// Rebuilds a transient product from the snapshot fields and delegates;
    /// the favorite entry itself stays.
    pub fn add_to_cart(&self, item: &FavoriteRecord) {
        self.store.add_to_cart(&item.to_product(), 1);
    }
}

impl Drop for FavoriteViewModel {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
