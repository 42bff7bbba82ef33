//! Core types for PetShop.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod shipping;

pub use cart::{AddOutcome, Cart, CartLine, MAX_LINE_QUANTITY, NewLine, QuantityChange};
pub use id::{ProductId, ProductIdError};
pub use price::{CurrencyCode, MAX_UNIT_PRICE, Price, PriceError, PriceTag, SHOP_CURRENCY};
pub use shipping::{FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD, ShippingQuote};
