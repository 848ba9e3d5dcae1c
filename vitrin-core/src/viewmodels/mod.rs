//! Reactive projections over the persisted store
//!
//! Each view-model loads its records at construction, subscribes to the
//! relevant store topic, reloads fully on every notification and re-emits an
//! update signal to its own subscribers. Dropping a view-model aborts its
//! listener task, so no signal fires after consumer teardown.

pub mod cart;
pub mod favorite;
pub mod product_detail;

pub use cart::CartViewModel;
pub use favorite::FavoriteViewModel;
pub use product_detail::ProductDetailViewModel;

/// Update channel capacity shared by the view-models
pub(crate) const CHANNEL_CAPACITY: usize = 64;
