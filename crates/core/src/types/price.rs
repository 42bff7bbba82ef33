//! Type-safe price representation using decimal arithmetic.
//!
//! Prices reach the cart as the strings printed on product cards, in the shop's
//! locale (`"12,50€"`). [`PriceTag`] keeps that string for display and the
//! parsed [`Price`] for arithmetic, so totals never see an unparsed value.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places shown for money amounts.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Unit prices must be below this amount (1,000,000).
///
/// With [`MAX_LINE_QUANTITY`](super::cart::MAX_LINE_QUANTITY) this keeps every
/// cart total far inside the range of [`Decimal`].
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// The only currency the shop sells in.
pub const SHOP_CURRENCY: CurrencyCode = CurrencyCode::EUR;

/// Errors that can occur when parsing a displayed price.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number once the currency symbol is removed.
    #[error("price {0:?} is not a valid amount")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price {0:?} cannot be negative")]
    Negative(String),
    /// The amount is at or above [`MAX_UNIT_PRICE`].
    #[error("price {0:?} is out of range")]
    OutOfRange(String),
    /// The price is in a currency other than [`SHOP_CURRENCY`].
    #[error("price {price:?} is in {currency:?}, only EUR is accepted")]
    UnsupportedCurrency {
        /// The price as displayed.
        price: String,
        /// The currency its symbol denotes.
        currency: CurrencyCode,
    },
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the shop currency.
    #[must_use]
    pub const fn eur(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::EUR)
    }

    /// Parse a price as printed on a product card.
    ///
    /// The `€` symbol (leading or trailing) and surrounding whitespace are
    /// stripped and a decimal comma is normalized to a dot. A price without a
    /// symbol is read as euros. Thousands separators are not accepted:
    /// `"1.234,50€"` is rejected rather than read as a different amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the price carries another currency's symbol, or if
    /// the remaining text is empty, not a decimal number, negative, or not
    /// below [`MAX_UNIT_PRICE`].
    pub fn parse_display(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let currency_code = CurrencyCode::detect(trimmed).unwrap_or(SHOP_CURRENCY);
        if currency_code != SHOP_CURRENCY {
            return Err(PriceError::UnsupportedCurrency {
                price: s.to_owned(),
                currency: currency_code,
            });
        }
        let number = trimmed
            .trim_start_matches(currency_code.symbol())
            .trim_end_matches(currency_code.symbol())
            .trim()
            .replace(',', ".");

        if number.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount =
            Decimal::from_str(&number).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(s.to_owned()));
        }
        if amount >= MAX_UNIT_PRICE {
            return Err(PriceError::OutOfRange(s.to_owned()));
        }

        Ok(Self::new(amount, currency_code))
    }

    /// Multiply by a quantity, keeping the currency. Saturates at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(
            self.amount.saturating_mul(Decimal::from(quantity)),
            self.currency_code,
        )
    }

    /// Format for display (e.g., `"24.99€"`, `"$19.99"`).
    #[must_use]
    pub fn display(&self) -> String {
        let amount = round_money(self.amount);
        if self.currency_code.symbol_after_amount() {
            format!("{amount:.2}{}", self.currency_code.symbol())
        } else {
            format!("{}{amount:.2}", self.currency_code.symbol())
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Round a money amount to two decimal places, halves away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// ISO 4217 currency codes whose symbols are recognized on price strings.
///
/// Only [`SHOP_CURRENCY`] is accepted into a cart; the others are recognized
/// so a foreign price is rejected instead of misread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    USD,
    GBP,
}

impl CurrencyCode {
    const ALL: [Self; 3] = [Self::EUR, Self::USD, Self::GBP];

    /// The printed currency symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::USD => "$",
            Self::GBP => "£",
        }
    }

    /// Whether the symbol is printed after the amount (`"4.99€"`).
    #[must_use]
    pub const fn symbol_after_amount(self) -> bool {
        matches!(self, Self::EUR)
    }

    fn detect(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| s.contains(code.symbol()))
    }
}

/// A displayed price string together with its parsed value.
///
/// Serializes as the display string so the stored cart keeps exactly what the
/// product card showed; deserializing re-parses it.
///
/// ```
/// use petshop_core::PriceTag;
///
/// let tag = PriceTag::parse("24,99€").unwrap();
/// assert_eq!(tag.as_str(), "24,99€");
/// assert_eq!(tag.price().display(), "24.99€");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PriceTag {
    display: String,
    price: Price,
}

impl PriceTag {
    /// Parse a displayed price string.
    ///
    /// # Errors
    ///
    /// See [`Price::parse_display`].
    pub fn parse(display: &str) -> Result<Self, PriceError> {
        let price = Price::parse_display(display)?;
        Ok(Self {
            display: display.trim().to_owned(),
            price,
        })
    }

    /// The string as it was displayed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// The parsed price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// The parsed amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.price.amount
    }
}

impl fmt::Display for PriceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl TryFrom<String> for PriceTag {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PriceTag> for String {
    fn from(tag: PriceTag) -> Self {
        tag.display
    }
}
