//! The cart collection and its mutation rules.
//!
//! [`Cart`] is an insertion-ordered list of [`CartLine`]s keyed by
//! [`ProductId`]. Every mutation goes through a method here, which is where the
//! two invariants live: ids are unique (adding a known id bumps its quantity)
//! and every line has a quantity between 1 and [`MAX_LINE_QUANTITY`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{PriceError, PriceTag};
use super::shipping::ShippingQuote;

/// Highest quantity a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Unique key within the cart.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price as displayed.
    pub price: PriceTag,
    /// Pre-discount price as displayed. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
    /// Display image reference.
    pub image: String,
    /// Always within `1..=MAX_LINE_QUANTITY`.
    pub quantity: u32,
    /// When the line was first inserted.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.price().times(self.quantity).amount
    }

    /// Whether the card showed a different pre-discount price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price
            .as_deref()
            .is_some_and(|original| original.trim() != self.price.as_str())
    }
}

/// A product as offered for adding to the cart.
///
/// This is whatever the product card displays at the moment of the add; the
/// price is still the raw displayed string and is validated by [`Cart::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLine {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub image: String,
    #[serde(default)]
    pub original_price: Option<String>,
}

impl NewLine {
    /// Build from a product card, deriving the id from the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank.
    pub fn from_card(
        name: &str,
        price: &str,
        image: &str,
        original_price: Option<&str>,
    ) -> Result<Self, super::id::ProductIdError> {
        Ok(Self {
            id: ProductId::from_name(name)?,
            name: name.trim().to_owned(),
            price: price.trim().to_owned(),
            image: image.to_owned(),
            original_price: original_price
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        })
    }
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended with quantity 1.
    Inserted,
    /// An existing line's quantity was incremented.
    Incremented { quantity: u32 },
    /// The existing line was already at [`MAX_LINE_QUANTITY`].
    AtLimit,
}

/// Result of [`Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// No line with that id exists.
    Missing,
    /// The requested quantity was zero or negative; the line was removed.
    Removed,
    /// The quantity was changed.
    Updated { from: u32, to: u32 },
    /// The requested quantity exceeded the cap; the line now holds the cap.
    Clamped { requested: i64, to: u32 },
    /// The line already held the requested quantity.
    Unchanged,
}

impl QuantityChange {
    /// Whether the cart was modified.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Removed | Self::Updated { .. } | Self::Clamped { .. }
        )
    }
}

/// An insertion-ordered collection of cart lines with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from previously stored lines.
    ///
    /// Lines sharing an id are merged into the first occurrence (quantities
    /// summed, capped); lines with a zero quantity are dropped.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            if line.quantity == 0 {
                continue;
            }
            if let Some(existing) = cart.get_mut(&line.id) {
                existing.quantity = existing
                    .quantity
                    .saturating_add(line.quantity)
                    .min(MAX_LINE_QUANTITY);
            } else {
                cart.lines.push(CartLine {
                    quantity: line.quantity.min(MAX_LINE_QUANTITY),
                    ..line
                });
            }
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    fn get_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| &line.id == id)
    }

    /// Whether the cart has zero lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add one unit of a product (find-or-append).
    ///
    /// A known id has its quantity incremented and every other field left
    /// untouched; an unknown id is appended with quantity 1 and `now` as its
    /// insertion time.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the cart untouched, if the product's price
    /// cannot be parsed.
    pub fn add(&mut self, product: &NewLine, now: DateTime<Utc>) -> Result<AddOutcome, PriceError> {
        let price = PriceTag::parse(&product.price)?;

        if let Some(existing) = self.get_mut(&product.id) {
            if existing.quantity >= MAX_LINE_QUANTITY {
                return Ok(AddOutcome::AtLimit);
            }
            existing.quantity += 1;
            return Ok(AddOutcome::Incremented {
                quantity: existing.quantity,
            });
        }

        self.lines.push(CartLine {
            id: product.id.clone(),
            name: product.name.clone(),
            price,
            original_price: product.original_price.clone(),
            image: product.image.clone(),
            quantity: 1,
            added_at: now,
        });
        Ok(AddOutcome::Inserted)
    }

    /// Remove a line. Returns the removed line, if it existed.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| &line.id == id)?;
        Some(self.lines.remove(index))
    }

    /// Set a line's quantity; zero or below removes the line.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> QuantityChange {
        if self.get(id).is_none() {
            return QuantityChange::Missing;
        }

        if quantity <= 0 {
            self.remove(id);
            return QuantityChange::Removed;
        }

        let Some(line) = self.get_mut(id) else {
            return QuantityChange::Missing;
        };

        let capped = u32::try_from(quantity)
            .unwrap_or(MAX_LINE_QUANTITY)
            .min(MAX_LINE_QUANTITY);
        let from = line.quantity;
        line.quantity = capped;

        if i64::from(capped) != quantity {
            QuantityChange::Clamped {
                requested: quantity,
                to: capped,
            }
        } else if from == capped {
            QuantityChange::Unchanged
        } else {
            QuantityChange::Updated { from, to: capped }
        }
    }

    /// Remove every line. Returns how many lines were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.lines.len();
        self.lines.clear();
        removed
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of unit price times quantity, before shipping.
    ///
    /// Saturates at [`Decimal::MAX`] rather than overflowing. Parsed unit
    /// prices are below [`MAX_UNIT_PRICE`](super::price::MAX_UNIT_PRICE), so
    /// a real cart stays far from that bound.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Shipping for this cart.
    ///
    /// An empty cart ships nothing and is quoted at zero; otherwise the
    /// subtotal rule of [`ShippingQuote::for_subtotal`] applies.
    #[must_use]
    pub fn shipping_quote(&self) -> ShippingQuote {
        if self.is_empty() {
            ShippingQuote::empty_cart()
        } else {
            ShippingQuote::for_subtotal(self.subtotal())
        }
    }

    /// Subtotal plus shipping cost.
    #[must_use]
    pub fn final_total(&self) -> Decimal {
        self.subtotal().saturating_add(self.shipping_quote().cost)
    }
}
