//! Application state shared across handlers.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use crate::cart::{
    CartBadge, CartManager, CartRepository, FileStore, KeyValueStore, Notification,
    NotificationFeed,
};
use crate::catalog::{Catalog, CatalogError};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::navigation::CartLink;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The storefront serves a single
/// shopper, so there is exactly one [`CartManager`], guarded by a mutex.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    cart: Mutex<CartManager>,
    notifications: NotificationFeed,
    badge: CartBadge,
}

impl AppState {
    /// Create a new application state around an arbitrary cart store.
    ///
    /// The stored cart is loaded immediately.
    pub fn new(
        config: StorefrontConfig,
        store: impl KeyValueStore + 'static,
        catalog: Catalog,
    ) -> Self {
        let notifications = NotificationFeed::new();
        let badge = CartBadge::new();
        let repository = CartRepository::new(store, config.cart_slot.clone());
        let cart = CartManager::load(repository, badge.clone(), notifications.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart: Mutex::new(cart),
                notifications,
                badge,
            }),
        }
    }

    /// Create the state described by `config`: a file-backed cart under the
    /// data directory and the configured catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be loaded.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = Catalog::load(config.catalog_path.as_deref())?;
        let store = FileStore::new(&config.data_dir).with_quota(config.storage_quota_bytes);
        Ok(Self::new(config, store, catalog))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the configured cart page link.
    #[must_use]
    pub fn cart_link(&self) -> &CartLink {
        &self.inner.config.cart_link
    }

    /// Items in the cart, as shown on the header badge.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.inner.badge.count()
    }

    /// Run `f` with exclusive access to the cart.
    ///
    /// The mutation, its write and the view refresh all happen before the
    /// lock is released.
    pub fn with_cart<R>(&self, f: impl FnOnce(&mut CartManager) -> R) -> R {
        let mut cart = self
            .inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// Run `f` with exclusive access to the cart on the blocking thread pool.
    ///
    /// Cart writes hit the filesystem while the lock is held, so request
    /// handlers go through here rather than calling [`Self::with_cart`] on a
    /// runtime worker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the cart task panicked.
    pub async fn run_cart<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut CartManager) -> R + Send + 'static,
        R: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.with_cart(f))
            .await
            .map_err(|e| AppError::Internal(format!("cart task failed: {e}")))
    }

    /// Queue a notification outside of a cart operation.
    pub fn notify(&self, notification: Notification) {
        self.inner.notifications.push(notification);
    }

    /// Drain the notifications that have not expired yet.
    #[must_use]
    pub fn take_notifications(&self) -> Vec<Notification> {
        self.inner.notifications.take_live(Utc::now())
    }
}
