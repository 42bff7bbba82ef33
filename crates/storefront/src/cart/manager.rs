//! Cart state manager.
//!
//! [`CartManager`] owns the in-memory cart for one shopper. Every mutating
//! call completes in order before returning:
//!
//! 1. apply the change to the [`Cart`]
//! 2. write the whole cart to the [`CartRepository`]
//! 3. hand a fresh [`CartView`] to the [`ViewSink`]
//! 4. emit a [`Notification`], if the operation has one
//!
//! A failed write does not undo the change: the shopper keeps the in-memory
//! cart and is told it was not saved. The failure is also kept until
//! [`CartManager::take_save_error`] collects it, so a host that cannot keep the
//! in-memory cart alive can report the loss.

use chrono::Utc;
use petshop_core::{
    AddOutcome, Cart, CartLine, MAX_LINE_QUANTITY, NewLine, PriceError, ProductId, QuantityChange,
    ShippingQuote,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, info, warn};

use super::notify::{Notification, Notifier};
use super::store::{CartRepository, StoreError};
use super::view::{CartView, ViewSink};

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product's displayed price could not be parsed.
    #[error("cannot add {name}: {source}")]
    InvalidPrice {
        /// Product display name.
        name: String,
        /// Underlying parse error.
        #[source]
        source: PriceError,
    },
}

/// Owns the cart and keeps storage, view and notifications in step with it.
pub struct CartManager {
    cart: Cart,
    repository: CartRepository,
    sink: Box<dyn ViewSink>,
    notifier: Box<dyn Notifier>,
    save_error: Option<StoreError>,
}

impl CartManager {
    /// Load the stored cart and render it once.
    pub fn load(
        repository: CartRepository,
        view: impl ViewSink + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        let cart = repository.load();
        info!(
            slot = repository.slot(),
            lines = cart.len(),
            items = cart.total_item_count(),
            "Cart loaded"
        );

        let manager = Self {
            cart,
            repository,
            sink: Box::new(view),
            notifier: Box::new(notifier),
            save_error: None,
        };
        manager.refresh();
        manager
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidPrice`] if the displayed price cannot be
    /// parsed. The cart is left untouched and a danger notification is emitted.
    pub fn add_line(&mut self, product: &NewLine) -> Result<AddOutcome, CartError> {
        let outcome = match self.cart.add(product, Utc::now()) {
            Ok(outcome) => outcome,
            Err(source) => {
                warn!(
                    product_id = %product.id,
                    price = %product.price,
                    error = %source,
                    "Rejected product with invalid price"
                );
                self.notifier.notify(Notification::danger(format!(
                    "{} could not be added: its price is not valid",
                    product.name
                )));
                return Err(CartError::InvalidPrice {
                    name: product.name.clone(),
                    source,
                });
            }
        };

        if outcome == AddOutcome::AtLimit {
            warn!(product_id = %product.id, "Line already at quantity limit");
            self.notifier.notify(Notification::info(format!(
                "{} is limited to {MAX_LINE_QUANTITY} units per order",
                product.name
            )));
            return Ok(outcome);
        }

        info!(product_id = %product.id, ?outcome, "Added to cart");
        self.commit();
        self.notifier
            .notify(Notification::success(format!("{} added to cart!", product.name)));
        Ok(outcome)
    }

    /// Remove a line. Returns whether a line was removed; an unknown id is a
    /// no-op.
    pub fn remove_line(&mut self, id: &ProductId) -> bool {
        let Some(line) = self.cart.remove(id) else {
            return false;
        };

        info!(product_id = %id, quantity = line.quantity, "Removed from cart");
        self.commit();
        self.notifier
            .notify(Notification::info(format!("{} removed from cart", line.name)));
        true
    }

    /// Set a line's quantity. Zero or below removes the line; an unknown id is
    /// a no-op.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> QuantityChange {
        let name = self.cart.get(id).map(|line| line.name.clone());
        let change = self.cart.set_quantity(id, quantity);

        match change {
            QuantityChange::Missing | QuantityChange::Unchanged => return change,
            QuantityChange::Removed => {
                info!(product_id = %id, requested = quantity, "Removed from cart");
                self.commit();
                self.notifier.notify(Notification::info(format!(
                    "{} removed from cart",
                    name.unwrap_or_default()
                )));
            }
            QuantityChange::Updated { from, to } => {
                info!(product_id = %id, from, to, "Updated quantity");
                self.commit();
            }
            QuantityChange::Clamped { requested, to } => {
                warn!(product_id = %id, requested, to, "Quantity clamped to limit");
                self.commit();
                self.notifier.notify(Notification::info(format!(
                    "{} is limited to {to} units per order",
                    name.unwrap_or_default()
                )));
            }
        }
        change
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        let removed = self.cart.clear();
        info!(lines = removed, "Cleared cart");
        self.commit();
        self.notifier.notify(Notification::info("Cart emptied"));
    }

    /// The cart itself.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cart.subtotal()
    }

    /// Shipping for the current cart.
    #[must_use]
    pub fn shipping_quote(&self) -> ShippingQuote {
        self.cart.shipping_quote()
    }

    /// Subtotal plus shipping.
    #[must_use]
    pub fn final_total(&self) -> Decimal {
        self.cart.final_total()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// The current view model.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::render(&self.cart)
    }

    /// Take the error from the most recent write, if it failed.
    ///
    /// Every write replaces the previous outcome, so `None` after a mutation
    /// means that mutation is stored.
    pub fn take_save_error(&mut self) -> Option<StoreError> {
        self.save_error.take()
    }

    fn commit(&mut self) {
        self.save_error = self.repository.save(&self.cart).err();
        if let Some(e) = &self.save_error {
            error!(slot = self.repository.slot(), error = %e, "Failed to save cart");
            self.notifier.notify(Notification::danger(
                "Your cart could not be saved; changes will be lost when you leave",
            ));
        }
        self.refresh();
    }

    fn refresh(&self) {
        self.sink.refresh(&self.view());
    }
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("cart", &self.cart)
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}
