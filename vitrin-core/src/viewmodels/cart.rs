//! Cart view-model

use super::CHANNEL_CAPACITY;
use crate::store::ProductStore;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::models::CartRecord;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Reactive view over the cart table
///
/// Must be created inside a Tokio runtime; the change listener runs as a
/// background task and is aborted on drop.
pub struct CartViewModel {
    store: ProductStore,
    items: Arc<RwLock<Vec<CartRecord>>>,
    update_tx: broadcast::Sender<()>,
    listener: JoinHandle<()>,
}

impl CartViewModel {
    pub fn new(store: ProductStore) -> Self {
        let items = Arc::new(RwLock::new(store.fetch_cart_items()));
        let (update_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let rx = store.subscribe_cart();
        let listener = spawn_reload_listener(rx, store.clone(), items.clone(), update_tx.clone());

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

    /// Current cart records
    pub fn items(&self) -> Vec<CartRecord> {
        self.items.read().clone()
    }

    pub fn number_of_items(&self) -> usize {
        self.items.read().len()
    }

    pub fn item_at(&self, index: usize) -> Option<CartRecord> {
        self.items.read().get(index).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Set the quantity of a cart line; zero or below removes it
    pub fn update_quantity(&self, item: &CartRecord, quantity: i64) {
        self.store
            .update_cart_item_quantity(&item.product_id, quantity);
    }

    /// Remove a cart line
    pub fn remove_item(&self, item: &CartRecord) {
        self.store.remove_from_cart(&item.product_id);
    }

    /// Total of price × quantity over all lines, rounded to a whole amount
    pub fn total_price(&self) -> String {
        let total: Decimal = self
            .items
            .read()
            .iter()
            .map(|item| {
                let price = Decimal::from_str(&item.product_price).unwrap_or_default();
                price * Decimal::from(item.quantity)
            })
            .sum();
        format!("{} ₺", total.round())
    }

    /// Sum of all line quantities
    pub fn total_item_count(&self) -> i64 {
        self.items.read().iter().map(|item| item.quantity).sum()
    }
}

impl Drop for CartViewModel {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Reload the records and re-signal on every store notification
fn spawn_reload_listener(
    mut rx: broadcast::Receiver<()>,
    store: ProductStore,
    items: Arc<RwLock<Vec<CartRecord>>>,
    update_tx: broadcast::Sender<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                // A lagged receiver still wants the freshest state
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    *items.write() = store.fetch_cart_items();
                    let _ = update_tx.send(());
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
