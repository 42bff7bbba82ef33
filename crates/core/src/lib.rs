//! PetShop Core - Shared cart types library.
//!
//! This crate provides the types shared by every PetShop component:
//! - `storefront` - Public catalog and cart pages
//! - `cli` - Command-line cart management
//!
//! # Architecture
//!
//! The core crate contains only types and pure cart rules - no I/O, no
//! storage, no rendering. Persistence and presentation are layered on top by
//! the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, cart lines, the cart collection and shipping

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
