//! Product catalog shown on the home page.
//!
//! The catalog is display data only: each card shows a name, a price string,
//! an image and optionally a crossed-out original price, and its add-to-cart
//! form submits exactly those strings. There is no pricing authority behind
//! it; the cart validates whatever a card submits.
//!
//! The catalog is read from a JSON file when `PETSHOP_CATALOG_PATH` is set,
//! otherwise the built-in product list is used.
//!
//! ```json
//! [
//!   { "name": "Dog Food", "price": "24,99€", "originalPrice": "29,99€",
//!     "image": "/static/img/dog-food.svg", "category": "dogs" }
//! ]
//! ```

use std::path::Path;

use petshop_core::ProductId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog product {index} has an empty name")]
    UnnamedProduct { index: usize },
}

/// A product card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub name: String,
    /// Price as displayed, e.g. `"24,99€"`.
    pub price: String,
    #[serde(default)]
    pub original_price: Option<String>,
    pub image: String,
    #[serde(default)]
    pub category: String,
}

/// Card data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    /// Only set when the card shows a discount.
    pub original_price: Option<String>,
    pub image: String,
    pub category: String,
}

impl From<&CatalogProduct> for ProductCardView {
    fn from(product: &CatalogProduct) -> Self {
        Self {
            id: ProductId::from_name(&product.name)
                .map(|id| id.to_string())
                .unwrap_or_default(),
            name: product.name.clone(),
            price: product.price.clone(),
            original_price: product
                .original_price
                .clone()
                .filter(|original| original.trim() != product.price.trim()),
            image: product.image.clone(),
            category: product.category.clone(),
        }
    }
}

/// The list of products offered on the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<CatalogProduct>,
}

impl Catalog {
    /// Create a catalog from products.
    #[must_use]
    pub const fn new(products: Vec<CatalogProduct>) -> Self {
        Self { products }
    }

    /// Load from a JSON file, or the built-in list when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a product has
    /// an empty name.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };

        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a JSON product list.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a product has an empty name.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<CatalogProduct> = serde_json::from_str(json)?;
        if let Some(index) = products.iter().position(|p| p.name.trim().is_empty()) {
            return Err(CatalogError::UnnamedProduct { index });
        }
        Ok(Self::new(products))
    }

    /// The built-in product list.
    #[must_use]
    pub fn builtin() -> Self {
        let product =
            |name: &str, price: &str, original: Option<&str>, image: &str, category: &str| {
                CatalogProduct {
                    name: name.to_owned(),
                    price: price.to_owned(),
                    original_price: original.map(str::to_owned),
                    image: format!("/static/img/{image}"),
                    category: category.to_owned(),
                }
            };

        Self::new(vec![
            product("Dog Food", "24,99€", Some("29,99€"), "dog-food.svg", "dogs"),
            product("Chew Bone", "6,50€", None, "chew-bone.svg", "dogs"),
            product("Dog Leash", "12,90€", None, "dog-leash.svg", "dogs"),
            product("Cat Food", "19,95€", Some("22,50€"), "cat-food.svg", "cats"),
            product("Cat Scratcher", "34,00€", None, "cat-scratcher.svg", "cats"),
            product("Feather Toy", "4,75€", None, "feather-toy.svg", "cats"),
        ])
    }

    /// Products in display order.
    #[must_use]
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    /// Card data for every product.
    #[must_use]
    pub fn cards(&self) -> Vec<ProductCardView> {
        self.products.iter().map(ProductCardView::from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use petshop_core::PriceTag;

    use super::*;

    #[test]
    fn test_builtin_prices_are_valid() {
        for product in Catalog::builtin().products() {
            assert!(PriceTag::parse(&product.price).is_ok(), "{}", product.name);
        }
    }

    #[test]
    fn test_cards_derive_ids_and_discounts() {
        let cards = Catalog::builtin().cards();
        assert_eq!(cards[0].id, "dog_food");
        assert_eq!(cards[0].original_price.as_deref(), Some("29,99€"));
        assert_eq!(cards[1].original_price, None);
    }

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(
            r#"[
                {"name":"Bird Seed","price":"3,20€","originalPrice":"3,20€","image":"/img/seed.png"}
            ]"#,
        )
        .unwrap();

        let cards = catalog.cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "bird_seed");
        // Same original and current price is not a discount
        assert_eq!(cards[0].original_price, None);
    }

    #[test]
    fn test_from_json_rejects_unnamed() {
        let result = Catalog::from_json(r#"[{"name":" ","price":"1€","image":""}]"#);
        assert!(matches!(result, Err(CatalogError::UnnamedProduct { index: 0 })));
    }

    #[test]
    fn test_load_without_path_is_builtin() {
        assert_eq!(Catalog::load(None).unwrap(), Catalog::builtin());
    }
}
