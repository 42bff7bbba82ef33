//! Shipping quotes derived from the cart subtotal.

use rust_decimal::Decimal;
use serde::Serialize;

use super::price::Price;

/// Orders at or above this subtotal ship for free (50.00).
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(5000, 0, 0, false, 2);

/// Flat shipping fee charged below the threshold (4.99).
pub const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(499, 0, 0, false, 2);

/// Shipping cost and description for a given subtotal.
///
/// Quotes are never stored; they are recomputed from the subtotal each time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    /// Shipping cost in the shop currency.
    pub cost: Decimal,
    /// Human-readable description of the rule that applied.
    pub description: String,
    /// Whether the order ships for free.
    pub is_free: bool,
}

impl ShippingQuote {
    /// Apply the shipping rule to a subtotal.
    ///
    /// Below [`FREE_SHIPPING_THRESHOLD`] the flat fee applies, including a
    /// subtotal of zero; at or above it shipping is free.
    #[must_use]
    pub fn for_subtotal(subtotal: Decimal) -> Self {
        let threshold = Price::eur(FREE_SHIPPING_THRESHOLD).display();
        if subtotal < FREE_SHIPPING_THRESHOLD {
            Self {
                cost: FLAT_SHIPPING_FEE,
                description: format!("{} (order < {threshold})", Price::eur(FLAT_SHIPPING_FEE)),
                is_free: false,
            }
        } else {
            Self {
                cost: Decimal::ZERO,
                description: format!("Free (order ≥ {threshold})"),
                is_free: true,
            }
        }
    }

    /// Quote for a cart with no lines: nothing ships, so nothing is charged.
    #[must_use]
    pub fn empty_cart() -> Self {
        Self {
            cost: Decimal::ZERO,
            description: "Free (cart is empty)".to_string(),
            is_free: true,
        }
    }

    /// Amount still needed to reach free shipping, if any.
    #[must_use]
    pub fn remaining_for_free(subtotal: Decimal) -> Option<Decimal> {
        (subtotal < FREE_SHIPPING_THRESHOLD).then(|| FREE_SHIPPING_THRESHOLD - subtotal)
    }

    /// Short label for the summary panel: `"Free"` or the fee.
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_free {
            "Free".to_string()
        } else {
            Price::eur(self.cost).display()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_constants() {
        assert_eq!(FREE_SHIPPING_THRESHOLD, dec("50.00"));
        assert_eq!(FLAT_SHIPPING_FEE, dec("4.99"));
    }

    #[test]
    fn test_below_threshold_charges_fee() {
        let quote = ShippingQuote::for_subtotal(dec("49.99"));
        assert_eq!(quote.cost, dec("4.99"));
        assert!(!quote.is_free);
        assert_eq!(quote.description, "4.99€ (order < 50.00€)");
        assert_eq!(quote.label(), "4.99€");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let quote = ShippingQuote::for_subtotal(dec("50.00"));
        assert_eq!(quote.cost, Decimal::ZERO);
        assert!(quote.is_free);
        assert_eq!(quote.label(), "Free");
    }

    #[test]
    fn test_zero_subtotal_follows_rule() {
        // The bare rule treats zero as below threshold
        let quote = ShippingQuote::for_subtotal(Decimal::ZERO);
        assert_eq!(quote.cost, dec("4.99"));
        assert!(!quote.is_free);
    }

    #[test]
    fn test_empty_cart_quote() {
        let quote = ShippingQuote::empty_cart();
        assert_eq!(quote.cost, Decimal::ZERO);
        assert!(quote.is_free);
    }

    #[test]
    fn test_remaining_for_free() {
        assert_eq!(
            ShippingQuote::remaining_for_free(dec("49.98")),
            Some(dec("0.02"))
        );
        assert_eq!(ShippingQuote::remaining_for_free(dec("50")), None);
        assert_eq!(ShippingQuote::remaining_for_free(dec("75.10")), None);
    }
}
