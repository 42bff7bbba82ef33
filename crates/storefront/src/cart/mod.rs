//! Cart state, persistence and presentation.
//!
//! # Architecture
//!
//! - [`store`] - Key-value storage backends and the cart repository
//! - [`manager`] - `CartManager`, the single owner of the shopper's cart
//! - [`view`] - Pure cart-to-view-model transform and view sinks
//! - [`notify`] - Transient notifications
//!
//! The pure cart rules (ids, prices, quantities, shipping) live in
//! `petshop-core`; this module wires them to storage and display.
//!
//! # Example
//!
//! ```rust,ignore
//! use petshop_core::NewLine;
//! use petshop_storefront::cart::{
//!     CartBadge, CartManager, CartRepository, FileStore, NotificationFeed,
//! };
//!
//! let repository = CartRepository::new(FileStore::new("data"), "petshop_cart");
//! let mut manager = CartManager::load(repository, CartBadge::new(), NotificationFeed::new());
//!
//! let product = NewLine::from_card("Dog Food", "24,99€", "/static/img/dog-food.svg", None)?;
//! manager.add_line(&product)?;
//! assert_eq!(manager.total_item_count(), 1);
//! ```

pub mod manager;
pub mod notify;
pub mod store;
pub mod view;

pub use manager::{CartError, CartManager};
pub use notify::{
    LogNotifier, NOTIFICATION_TTL, Notification, NotificationFeed, NotificationLevel, Notifier,
};
pub use store::{
    CART_SCHEMA_VERSION, CartRepository, DEFAULT_CART_SLOT, FileStore, KeyValueStore, MemoryStore,
    StoreError,
};
pub use view::{CartBadge, CartItemView, CartView, SummaryView, ViewSink};
