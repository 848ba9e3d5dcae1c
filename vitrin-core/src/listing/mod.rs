//! Product listing engine
//!
//! Holds the full fetched product set and derives a filtered, searched and
//! sorted subset with a paginated window over it. Consumers observe the
//! engine through a broadcast event stream instead of callbacks, so teardown
//! is just dropping the receiver.
//!
//! All consumer-visible state lives behind one lock; every mutation happens
//! under it and the lock is never held across an await, so readers never see
//! a half-applied update.

use crate::catalog::ProductCatalog;
use parking_lot::RwLock;
use shared::models::{FilterOptions, Product, SortType};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Number of products appended per page
const PAGE_SIZE: usize = 4;

/// Event channel capacity
const CHANNEL_CAPACITY: usize = 64;

/// Listing lifecycle events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEvent {
    /// A catalog fetch began
    LoadingStarted,
    /// The catalog fetch completed, successfully or not
    LoadingFinished,
    /// The displayed window changed; re-read the accessors
    ProductsUpdated,
    /// The catalog fetch failed with a display message
    Failed(String),
}

#[derive(Debug, Default)]
struct ListingState {
    all_products: Vec<Product>,
    filtered: Vec<Product>,
    displayed: Vec<Product>,
    filter_options: FilterOptions,
    loading: bool,
}

impl ListingState {
    /// Recompute the filtered set and reset the window to the first page
    fn rederive(&mut self) {
        self.filtered = derive(&self.all_products, &self.filter_options);
        let end = PAGE_SIZE.min(self.filtered.len());
        self.displayed = self.filtered[..end].to_vec();
    }
}

/// Filter, search and sort the full set into the listing order
///
/// Pure function of its inputs; `sort_by` is stable, so identical input
/// yields identical output.
fn derive(all_products: &[Product], options: &FilterOptions) -> Vec<Product> {
    let mut products: Vec<Product> = all_products.to_vec();

    if !options.search_text.is_empty() {
        let needle = options.search_text.to_lowercase();
        products.retain(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.brand.to_lowercase().contains(&needle)
                || p.model.to_lowercase().contains(&needle)
        });
    }

    if !options.selected_brands.is_empty() {
        products.retain(|p| options.selected_brands.contains(&p.brand));
    }

    if !options.selected_models.is_empty() {
        products.retain(|p| options.selected_models.contains(&p.model));
    }

    match options.sort_type {
        SortType::OldToNew => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortType::NewToOld => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortType::PriceHighToLow => products.sort_by(|a, b| b.price_value().cmp(&a.price_value())),
        SortType::PriceLowToHigh => products.sort_by(|a, b| a.price_value().cmp(&b.price_value())),
    }

    products
}

/// Listing engine over a product catalog
pub struct ProductListing {
    catalog: Arc<dyn ProductCatalog>,
    state: RwLock<ListingState>,
    event_tx: broadcast::Sender<ListingEvent>,
}

impl std::fmt::Debug for ProductListing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductListing").finish_non_exhaustive()
    }
}

impl ProductListing {
    /// Create a listing over the given catalog
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        let (event_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            catalog,
            state: RwLock::new(ListingState::default()),
            event_tx,
        }
    }

    /// Subscribe to listing events
    pub fn subscribe(&self) -> broadcast::Receiver<ListingEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: ListingEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Fetch the full catalog and re-derive the listing
    ///
    /// A no-op while a fetch is already in flight. On failure the previous
    /// product set stays untouched and a single `Failed` event carries the
    /// display message.
    pub async fn fetch_products(&self) {
        {
            let mut state = self.state.write();
            if state.loading {
                return;
            }
            state.loading = true;
        }
        self.emit(ListingEvent::LoadingStarted);

        let result = self.catalog.fetch_products().await;

        self.state.write().loading = false;
        self.emit(ListingEvent::LoadingFinished);

        match result {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Catalog fetch succeeded");
                {
                    let mut state = self.state.write();
                    state.all_products = products;
                    state.rederive();
                }
                self.emit(ListingEvent::ProductsUpdated);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed");
                self.emit(ListingEvent::Failed(e.to_string()));
            }
        }
    }

    /// Set the search text and re-derive
    pub fn search_products(&self, text: &str) {
        {
            let mut state = self.state.write();
            state.filter_options.search_text = text.to_string();
            state.rederive();
        }
        self.emit(ListingEvent::ProductsUpdated);
    }

    /// Replace the filter options wholesale and re-derive
    pub fn apply_filter(&self, options: FilterOptions) {
        {
            let mut state = self.state.write();
            state.filter_options = options;
            state.rederive();
        }
        self.emit(ListingEvent::ProductsUpdated);
    }

    /// Append the next page when the consumer is near the end of the window
    ///
    /// Triggers only when the visible index is within the last two displayed
    /// items, more filtered products remain, and no fetch is in flight. The
    /// append happens under the state lock, so page loads never overlap.
    pub fn load_more_products_if_needed(&self, visible_index: usize) {
        {
            let mut state = self.state.write();
            if state.loading
                || visible_index + 2 < state.displayed.len()
                || state.displayed.len() >= state.filtered.len()
            {
                return;
            }

            let start = state.displayed.len();
            let end = (start + PAGE_SIZE).min(state.filtered.len());
            let next_page = state.filtered[start..end].to_vec();
            state.displayed.extend(next_page);
        }
        self.emit(ListingEvent::ProductsUpdated);
    }

    // ========== Read Accessors ==========

    /// Number of currently displayed products
    pub fn number_of_products(&self) -> usize {
        self.state.read().displayed.len()
    }

    /// Displayed product at the given index, if in bounds
    pub fn product_at(&self, index: usize) -> Option<Product> {
        self.state.read().displayed.get(index).cloned()
    }

    /// The current displayed window
    pub fn displayed_products(&self) -> Vec<Product> {
        self.state.read().displayed.clone()
    }

    /// Unique brands across the full fetched set, sorted ascending
    pub fn all_brands(&self) -> Vec<String> {
        let state = self.state.read();
        let brands: BTreeSet<String> = state
            .all_products
            .iter()
            .map(|p| p.brand.clone())
            .collect();
        brands.into_iter().collect()
    }

    /// Unique models across the full fetched set, sorted ascending
    pub fn all_models(&self) -> Vec<String> {
        let state = self.state.read();
        let models: BTreeSet<String> = state
            .all_products
            .iter()
            .map(|p| p.model.clone())
            .collect();
        models.into_iter().collect()
    }

    /// The filter options currently applied
    pub fn current_filter_options(&self) -> FilterOptions {
        self.state.read().filter_options.clone()
    }

    /// Whether more filtered products remain beyond the displayed window
    pub fn has_more_products(&self) -> bool {
        let state = self.state.read();
        state.displayed.len() < state.filtered.len()
    }

    /// Whether the listing is empty and idle
    pub fn is_empty(&self) -> bool {
        let state = self.state.read();
        state.displayed.is_empty() && !state.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FetchError, FetchResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn product(id: &str, name: &str, brand: &str, model: &str, price: &str, created_at: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            image: format!("https://example.com/{id}.png"),
            price: price.to_string(),
            description: String::new(),
            model: model.to_string(),
            brand: brand.to_string(),
            created_at: created_at.to_string(),
        }
    }

    fn phones() -> Vec<Product> {
        vec![
            product("1", "Galaxy S22", "Samsung", "S22", "12000", "2023-01-02T00:00:00.000Z"),
            product("2", "Lenovo Tab", "Lenovo", "Tab M10", "5000", "2023-01-01T00:00:00.000Z"),
            product(
                "3",
                "iPhone 13 Pro Max 256Gb",
                "Apple",
                "13 Pro Max",
                "25000",
                "2023-01-03T00:00:00.000Z",
            ),
            product("4", "Redmi Note 11", "Xiaomi", "Note 11", "15000", "2023-01-04T00:00:00.000Z"),
        ]
    }

    /// Canned catalog double
    struct MockCatalog {
        products: Vec<Product>,
        should_fail: bool,
        calls: AtomicUsize,
    }

    impl MockCatalog {
        fn ok(products: Vec<Product>) -> Self {
            Self {
                products,
                should_fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                products: Vec::new(),
                should_fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProductCatalog for MockCatalog {
        async fn fetch_products(&self) -> FetchResult<Vec<Product>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                Err(FetchError::Decode)
            } else {
                Ok(self.products.clone())
            }
        }
    }

    /// Catalog double that blocks until released, for loading-guard tests
    struct GatedCatalog {
        gate: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProductCatalog for GatedCatalog {
        async fn fetch_products(&self) -> FetchResult<Vec<Product>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(Vec::new())
        }
    }

    fn drain(rx: &mut broadcast::Receiver<ListingEvent>) -> Vec<ListingEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let products = phones();
        let options = FilterOptions {
            sort_type: SortType::PriceLowToHigh,
            ..Default::default()
        };
        let first = derive(&products, &options);
        let second = derive(&products, &options);
        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2", "1", "4", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let mut options = FilterOptions {
            search_text: "iphone".to_string(),
            ..Default::default()
        };
        let result = derive(&phones(), &options);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "iPhone 13 Pro Max 256Gb");

        // Matches brand and model substrings too
        options.search_text = "SAMS".to_string();
        assert_eq!(derive(&phones(), &options).len(), 1);
        options.search_text = "note".to_string();
        assert_eq!(derive(&phones(), &options).len(), 1);
        options.search_text = "no such thing".to_string();
        assert!(derive(&phones(), &options).is_empty());
    }

    #[test]
    fn test_brand_and_model_filters_are_exact() {
        let options = FilterOptions {
            selected_brands: ["Apple".to_string(), "Samsung".to_string()].into(),
            ..Default::default()
        };
        let result = derive(&phones(), &options);
        assert_eq!(result.len(), 2);

        let options = FilterOptions {
            selected_brands: ["Apple".to_string()].into(),
            selected_models: ["S22".to_string()].into(),
            ..Default::default()
        };
        // Brand and model filters intersect
        assert!(derive(&phones(), &options).is_empty());
    }

    #[test]
    fn test_sort_orders() {
        let by_price_desc = derive(
            &phones(),
            &FilterOptions {
                sort_type: SortType::PriceHighToLow,
                ..Default::default()
            },
        );
        let prices: Vec<&str> = by_price_desc.iter().map(|p| p.price.as_str()).collect();
        assert_eq!(prices, ["25000", "15000", "12000", "5000"]);

        let by_date_asc = derive(&phones(), &FilterOptions::default());
        let ids: Vec<&str> = by_date_asc.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["2", "1", "3", "4"]);

        let by_date_desc = derive(
            &phones(),
            &FilterOptions {
                sort_type: SortType::NewToOld,
                ..Default::default()
            },
        );
        let ids: Vec<&str> = by_date_desc.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["4", "3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_fetch_populates_first_page() {
        let mut products = Vec::new();
        for i in 0..10 {
            products.push(product(
                &i.to_string(),
                "P",
                "B",
                "M",
                "100",
                &format!("2023-01-{:02}T00:00:00.000Z", i + 1),
            ));
        }
        let listing = ProductListing::new(Arc::new(MockCatalog::ok(products)));
        let mut rx = listing.subscribe();

        listing.fetch_products().await;

        assert_eq!(
            drain(&mut rx),
            vec![
                ListingEvent::LoadingStarted,
                ListingEvent::LoadingFinished,
                ListingEvent::ProductsUpdated,
            ]
        );
        assert_eq!(listing.number_of_products(), 4);
        assert!(listing.has_more_products());
        assert!(!listing.is_empty());
    }

    #[tokio::test]
    async fn test_pagination_appends_clamped_pages() {
        let mut products = Vec::new();
        for i in 0..10 {
            products.push(product(
                &i.to_string(),
                "P",
                "B",
                "M",
                "100",
                &format!("2023-01-{:02}T00:00:00.000Z", i + 1),
            ));
        }
        let listing = ProductListing::new(Arc::new(MockCatalog::ok(products)));
        listing.fetch_products().await;
        assert_eq!(listing.number_of_products(), 4);

        // Visible index far from the end does not trigger
        listing.load_more_products_if_needed(0);
        assert_eq!(listing.number_of_products(), 4);

        // Second-to-last item triggers the next page
        listing.load_more_products_if_needed(2);
        assert_eq!(listing.number_of_products(), 8);

        // Last page is clamped to the remainder
        listing.load_more_products_if_needed(7);
        assert_eq!(listing.number_of_products(), 10);
        assert!(!listing.has_more_products());

        // Nothing left to load
        listing.load_more_products_if_needed(9);
        assert_eq!(listing.number_of_products(), 10);
    }

    #[tokio::test]
    async fn test_fetch_failure_preserves_products_and_fails_once() {
        let listing = ProductListing::new(Arc::new(MockCatalog::ok(phones())));
        listing.fetch_products().await;
        assert_eq!(listing.number_of_products(), 4);

        let failing = ProductListing::new(Arc::new(MockCatalog::failing()));
        let mut rx = failing.subscribe();
        failing.fetch_products().await;
        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                ListingEvent::LoadingStarted,
                ListingEvent::LoadingFinished,
                ListingEvent::Failed("Failed to decode data".to_string()),
            ]
        );
        assert!(failing.is_empty());
    }

    #[tokio::test]
    async fn test_failure_after_success_keeps_previous_set() {
        // Same engine: successful fetch, then a failing one
        struct FlippingCatalog {
            calls: AtomicUsize,
            products: Vec<Product>,
        }

        #[async_trait]
        impl ProductCatalog for FlippingCatalog {
            async fn fetch_products(&self) -> FetchResult<Vec<Product>> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(self.products.clone())
                } else {
                    Err(FetchError::Decode)
                }
            }
        }

        let listing = ProductListing::new(Arc::new(FlippingCatalog {
            calls: AtomicUsize::new(0),
            products: phones(),
        }));
        listing.fetch_products().await;
        let before = listing.displayed_products();

        let mut rx = listing.subscribe();
        listing.fetch_products().await;
        let events = drain(&mut rx);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, ListingEvent::Failed(_)))
                .count(),
            1
        );
        assert_eq!(listing.displayed_products(), before);
    }

    #[tokio::test]
    async fn test_search_and_filter_reset_window() {
        let listing = ProductListing::new(Arc::new(MockCatalog::ok(phones())));
        listing.fetch_products().await;

        listing.search_products("iphone");
        assert_eq!(listing.number_of_products(), 1);
        assert_eq!(listing.product_at(0).unwrap().brand, "Apple");
        assert!(listing.product_at(1).is_none());

        // Clearing the search restores the full set
        listing.search_products("");
        assert_eq!(listing.number_of_products(), 4);

        listing.apply_filter(FilterOptions {
            selected_brands: ["Xiaomi".to_string()].into(),
            ..Default::default()
        });
        assert_eq!(listing.number_of_products(), 1);
        assert_eq!(
            listing.current_filter_options().selected_brands.len(),
            1
        );
    }

    #[tokio::test]
    async fn test_brands_and_models_are_unique_sorted() {
        let mut products = phones();
        products.push(product("5", "Galaxy S21", "Samsung", "S21", "9000", "2022-01-01T00:00:00.000Z"));
        let listing = ProductListing::new(Arc::new(MockCatalog::ok(products)));
        listing.fetch_products().await;

        assert_eq!(listing.all_brands(), ["Apple", "Lenovo", "Samsung", "Xiaomi"]);
        assert_eq!(
            listing.all_models(),
            ["13 Pro Max", "Note 11", "S21", "S22", "Tab M10"]
        );
    }

    #[tokio::test]
    async fn test_reentrant_fetch_is_ignored_while_loading() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let listing = Arc::new(ProductListing::new(Arc::new(GatedCatalog {
            gate: gate.clone(),
            calls: calls.clone(),
        })));

        let background = {
            let listing = listing.clone();
            tokio::spawn(async move { listing.fetch_products().await })
        };

        // Wait until the first fetch is blocked inside the catalog
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }

        // Guarded: returns immediately without a second catalog call
        listing.fetch_products().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        background.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
