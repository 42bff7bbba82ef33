//! Product identifiers derived from display names.
//!
//! Catalog pages carry no product ids of their own, so a product is keyed by a
//! slug of its display name: lowercased, with every character outside
//! `[a-z0-9]` replaced by `_`. The same name always yields the same id, which is
//! what lets a second add of the same product find the existing cart line.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The character substituted for anything outside `[a-z0-9]`.
pub const ID_SEPARATOR: char = '_';

/// Errors that can occur when building a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input is empty (or only whitespace, for names).
    #[error("product id cannot be empty")]
    Empty,
    /// The input contains a character that a derived id never contains.
    #[error("product id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A stable product identifier, unique within a cart.
///
/// ## Examples
///
/// ```
/// use petshop_core::ProductId;
///
/// let id = ProductId::from_name("Dog Food").unwrap();
/// assert_eq!(id.as_str(), "dog_food");
///
/// assert!(ProductId::parse("dog_food").is_ok());
/// assert!(ProductId::parse("Dog Food").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Derive an id from a product's display name.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError::Empty`] if the name is blank.
    pub fn from_name(name: &str) -> Result<Self, ProductIdError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductIdError::Empty);
        }

        let slug = name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() {
                    c
                } else {
                    ID_SEPARATOR
                }
            })
            .collect();

        Ok(Self(slug))
    }

    /// Parse an already-derived id.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or contains characters outside
    /// `[a-z0-9_]`.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ID_SEPARATOR))
        {
            return Err(ProductIdError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_lowercases_and_replaces() {
        let id = ProductId::from_name("Dog Food").unwrap();
        assert_eq!(id.as_str(), "dog_food");
    }

    #[test]
    fn test_from_name_replaces_each_character() {
        // Every disallowed character becomes its own separator
        let id = ProductId::from_name("Cat Toy - XL").unwrap();
        assert_eq!(id.as_str(), "cat_toy___xl");
    }

    #[test]
    fn test_from_name_non_ascii_letters() {
        let id = ProductId::from_name("Pienso Ñame 2kg").unwrap();
        assert_eq!(id.as_str(), "pienso__ame_2kg");
    }

    #[test]
    fn test_from_name_trims_whitespace() {
        let id = ProductId::from_name("  Bone  ").unwrap();
        assert_eq!(id.as_str(), "bone");
    }

    #[test]
    fn test_from_name_is_deterministic() {
        assert_eq!(
            ProductId::from_name("Premium Dog Food").unwrap(),
            ProductId::from_name("Premium Dog Food").unwrap()
        );
    }

    #[test]
    fn test_from_name_empty() {
        assert_eq!(ProductId::from_name(""), Err(ProductIdError::Empty));
        assert_eq!(ProductId::from_name("   "), Err(ProductIdError::Empty));
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        assert_eq!(
            ProductId::parse("Dog_food"),
            Err(ProductIdError::InvalidCharacter('D'))
        );
    }

    #[test]
    fn test_serde_rejects_invalid_id() {
        let result: Result<ProductId, _> = serde_json::from_str("\"not valid\"");
        assert!(result.is_err());

        let id: ProductId = serde_json::from_str("\"dog_food\"").unwrap();
        assert_eq!(id.as_str(), "dog_food");
    }
}
