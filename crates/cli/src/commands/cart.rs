//! Cart commands.
//!
//! Each command loads the stored cart into a [`CartManager`], applies one
//! operation, and prints the resulting cart. File access runs on the blocking
//! thread pool. A change that could not be written fails the command: the
//! in-memory cart does not outlive the process.

use std::io::{self, Write};
use std::path::PathBuf;

use petshop_core::{NewLine, ProductId, QuantityChange};
use petshop_storefront::cart::{CartManager, CartRepository, CartView, FileStore, LogNotifier};
use tracing::{debug, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where the cart is stored.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub data_dir: PathBuf,
    pub slot: String,
    pub quota: Option<u64>,
}

fn open(options: &StoreOptions) -> CartManager {
    let store = FileStore::new(&options.data_dir).with_quota(options.quota);
    let repository = CartRepository::new(store, options.slot.clone());
    CartManager::load(
        repository,
        |view: &CartView| debug!(items = view.summary.item_count, "Cart view refreshed"),
        LogNotifier,
    )
}

/// Load the cart on the blocking pool and run `f` against it.
async fn with_cart<T, F>(options: &StoreOptions, f: F) -> Result<T, BoxError>
where
    T: Send + 'static,
    F: FnOnce(&mut CartManager) -> Result<T, BoxError> + Send + 'static,
{
    let options = options.clone();
    tokio::task::spawn_blocking(move || {
        let mut manager = open(&options);
        f(&mut manager)
    })
    .await?
}

/// Fail if the manager's last write did not reach storage.
fn ensure_saved(manager: &mut CartManager) -> Result<(), BoxError> {
    match manager.take_save_error() {
        Some(e) => Err(format!("cart was not saved: {e}").into()),
        None => Ok(()),
    }
}

fn print(view: &CartView) -> Result<(), BoxError> {
    let mut stdout = io::stdout().lock();
    render(view, &mut stdout)?;
    Ok(())
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub async fn show(options: &StoreOptions, json: bool) -> Result<(), BoxError> {
    let view = with_cart(options, |manager| Ok(manager.view())).await?;

    if json {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &view)?;
        writeln!(stdout)?;
        return Ok(());
    }

    print(&view)
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the name is blank, the price cannot be parsed, or the
/// cart cannot be saved.
pub async fn add(
    options: &StoreOptions,
    name: &str,
    price: &str,
    image: &str,
    original_price: Option<&str>,
) -> Result<(), BoxError> {
    let product = NewLine::from_card(name, price, image, original_price)?;
    info!(product_id = %product.id, "Adding product");

    let view = with_cart(options, move |manager| {
        manager.add_line(&product)?;
        ensure_saved(manager)?;
        Ok(manager.view())
    })
    .await?;

    print(&view)
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the id is malformed or the cart cannot be saved.
pub async fn remove(options: &StoreOptions, id: &str) -> Result<(), BoxError> {
    let id = ProductId::parse(id)?;

    let view = with_cart(options, move |manager| {
        if !manager.remove_line(&id) {
            warn!(product_id = %id, "No line with this id");
        }
        ensure_saved(manager)?;
        Ok(manager.view())
    })
    .await?;

    print(&view)
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns an error if the id is malformed or the cart cannot be saved.
pub async fn set_quantity(
    options: &StoreOptions,
    id: &str,
    quantity: i64,
) -> Result<(), BoxError> {
    let id = ProductId::parse(id)?;

    let view = with_cart(options, move |manager| {
        if manager.set_quantity(&id, quantity) == QuantityChange::Missing {
            warn!(product_id = %id, "No line with this id");
        }
        ensure_saved(manager)?;
        Ok(manager.view())
    })
    .await?;

    print(&view)
}

/// Remove every line.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved or the output cannot be
/// written.
pub async fn clear(options: &StoreOptions) -> Result<(), BoxError> {
    let view = with_cart(options, |manager| {
        manager.clear();
        ensure_saved(manager)?;
        Ok(manager.view())
    })
    .await?;

    print(&view)
}

/// Write the cart as a plain-text table.
fn render(view: &CartView, out: &mut impl Write) -> io::Result<()> {
    if view.is_empty() {
        writeln!(out, "Your cart is empty.")?;
    }

    for item in &view.items {
        writeln!(
            out,
            "{:<20} {:<24} {:>10} x {:>2} {:>10}",
            item.id, item.name, item.unit_price, item.quantity, item.line_total
        )?;
    }

    let summary = &view.summary;
    writeln!(out)?;
    writeln!(out, "Items:     {}", summary.item_count)?;
    writeln!(out, "Subtotal:  {}", summary.subtotal)?;
    writeln!(
        out,
        "Shipping:  {} ({})",
        summary.shipping, summary.shipping_description
    )?;
    writeln!(out, "Total:     {}", summary.total)?;
    writeln!(out, "{}", summary.shipping_hint)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use petshop_core::Cart;
    use uuid::Uuid;

    use super::*;

    fn rendered(cart: &Cart) -> String {
        let mut out = Vec::new();
        render(&CartView::render(cart), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn temp_options() -> StoreOptions {
        StoreOptions {
            data_dir: std::env::temp_dir().join(format!("petshop-cli-{}", Uuid::new_v4())),
            slot: "petshop_cart".to_string(),
            quota: None,
        }
    }

    #[test]
    fn test_render_empty() {
        let text = rendered(&Cart::new());
        assert!(text.contains("Your cart is empty."));
        assert!(text.contains("Total:     0.00€"));
    }

    #[test]
    fn test_render_lines() {
        let mut cart = Cart::new();
        let product = NewLine::from_card("Dog Food", "24,99€", "", None).unwrap();
        cart.add(&product, Utc::now()).unwrap();
        cart.add(&product, Utc::now()).unwrap();

        let text = rendered(&cart);
        assert!(text.contains("dog_food"));
        assert!(text.contains("49.98€"));
        assert!(text.contains("Shipping:  4.99€"));
        assert!(text.contains("Total:     54.97€"));
    }

    #[tokio::test]
    async fn test_commands_share_stored_cart() {
        let options = temp_options();

        add(&options, "Chew Bone", "6,50€", "", None).await.unwrap();
        set_quantity(&options, "chew_bone", 4).await.unwrap();

        let view = with_cart(&options, |manager| Ok(manager.view())).await.unwrap();
        assert_eq!(view.summary.item_count, 4);
        assert_eq!(view.summary.subtotal, "26.00€");

        clear(&options).await.unwrap();
        let view = with_cart(&options, |manager| Ok(manager.view())).await.unwrap();
        assert!(view.is_empty());

        std::fs::remove_dir_all(&options.data_dir).ok();
    }

    #[tokio::test]
    async fn test_add_fails_when_cart_cannot_be_saved() {
        let options = StoreOptions {
            quota: Some(8),
            ..temp_options()
        };

        let result = add(&options, "Chew Bone", "6,50€", "", None).await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("cart was not saved"));
        assert!(!options.data_dir.join("petshop_cart.json").exists());
        std::fs::remove_dir_all(&options.data_dir).ok();
    }

    #[tokio::test]
    async fn test_add_with_foreign_currency_fails() {
        let options = temp_options();
        let result = add(&options, "Import Toy", "$30", "", None).await;
        assert!(result.is_err());

        let view = with_cart(&options, |manager| Ok(manager.view())).await.unwrap();
        assert!(view.is_empty());
        std::fs::remove_dir_all(&options.data_dir).ok();
    }

    #[tokio::test]
    async fn test_add_with_bad_price_fails() {
        let options = temp_options();
        let result = add(&options, "Mystery", "free", "", None).await;
        assert!(result.is_err());
        std::fs::remove_dir_all(&options.data_dir).ok();
    }
}
