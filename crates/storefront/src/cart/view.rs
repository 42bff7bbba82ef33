//! Cart view model.
//!
//! [`CartView::render`] is a pure transform from a [`Cart`] to display data:
//! formatted money strings, quantity stepper targets and the summary panel.
//! Askama templates and the CLI table both consume this model, so nothing
//! downstream needs to do arithmetic.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use petshop_core::{
    Cart, CartLine, FREE_SHIPPING_THRESHOLD, MAX_LINE_QUANTITY, Price, ShippingQuote,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// One row of the cart page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Unit price exactly as the product card showed it.
    pub unit_price: String,
    /// Pre-discount price, only when it differs from the unit price.
    pub original_price: Option<String>,
    /// Unit price times quantity, rounded to cents.
    pub line_total: String,
    pub quantity: u32,
    /// `"1 unit"` / `"3 units"`.
    pub quantity_label: String,
    /// Quantity submitted by the decrement button; zero removes the line.
    pub decrement_to: u32,
    /// Quantity submitted by the increment button.
    pub increment_to: u32,
    /// Whether the line is at the quantity cap.
    pub at_limit: bool,
    /// Upper bound for the direct-edit input.
    pub max_quantity: u32,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            name: line.name.clone(),
            image: line.image.clone(),
            unit_price: line.price.to_string(),
            original_price: line
                .is_discounted()
                .then(|| line.original_price.clone())
                .flatten(),
            line_total: money(line.line_total()),
            quantity: line.quantity,
            quantity_label: quantity_label(line.quantity),
            decrement_to: line.quantity.saturating_sub(1),
            increment_to: (line.quantity + 1).min(MAX_LINE_QUANTITY),
            at_limit: line.quantity >= MAX_LINE_QUANTITY,
            max_quantity: MAX_LINE_QUANTITY,
        }
    }
}

/// The summary panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub item_count: u64,
    pub subtotal: String,
    /// `"Free"` or the flat fee.
    pub shipping: String,
    pub shipping_description: String,
    /// Free-shipping confirmation or the amount still missing.
    pub shipping_hint: String,
    pub free_shipping: bool,
    pub total: String,
    pub checkout_enabled: bool,
}

/// Everything the cart page displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub summary: SummaryView,
}

impl CartView {
    /// Build the view model for a cart.
    #[must_use]
    pub fn render(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        let quote = cart.shipping_quote();
        let item_count = cart.total_item_count();

        let shipping = if cart.is_empty() {
            money(Decimal::ZERO)
        } else {
            quote.label()
        };

        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            summary: SummaryView {
                item_count,
                subtotal: money(subtotal),
                shipping,
                shipping_description: quote.description.clone(),
                shipping_hint: shipping_hint(subtotal),
                free_shipping: !cart.is_empty() && quote.is_free,
                total: money(cart.final_total()),
                checkout_enabled: item_count > 0,
            },
        }
    }

    /// Whether there is nothing to list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn money(amount: Decimal) -> String {
    Price::eur(amount).display()
}

fn quantity_label(quantity: u32) -> String {
    if quantity == 1 {
        "1 unit".to_string()
    } else {
        format!("{quantity} units")
    }
}

fn shipping_hint(subtotal: Decimal) -> String {
    ShippingQuote::remaining_for_free(subtotal).map_or_else(
        || format!("Free shipping! Order ≥ {}", money(FREE_SHIPPING_THRESHOLD)),
        |remaining| format!("Add {} more for free shipping", money(remaining)),
    )
}

/// Receives a fresh view model after every cart mutation.
pub trait ViewSink: Send {
    fn refresh(&self, view: &CartView);
}

impl<F> ViewSink for F
where
    F: Fn(&CartView) + Send,
{
    fn refresh(&self, view: &CartView) {
        self(view);
    }
}

/// Header badge counter, kept current by the cart manager.
///
/// Page handlers read the count without touching the cart itself.
#[derive(Debug, Clone, Default)]
pub struct CartBadge {
    count: Arc<AtomicU64>,
}

impl CartBadge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items currently in the cart.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl ViewSink for CartBadge {
    fn refresh(&self, view: &CartView) {
        self.count.store(view.summary.item_count, Ordering::Relaxed);
    }
}
