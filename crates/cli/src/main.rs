//! PetShop CLI - inspect and edit the stored cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! petshop-cli cart show
//!
//! # Add one unit of a product, as a catalog card would
//! petshop-cli cart add --name "Dog Food" --price "24,99€" --original-price "29,99€"
//!
//! # Set a quantity (zero or below removes the line)
//! petshop-cli cart set dog_food 3
//!
//! # Remove a line, or empty the cart
//! petshop-cli cart remove dog_food
//! petshop-cli cart clear
//! ```
//!
//! The cart is read from and written to the same file the storefront uses:
//! `<PETSHOP_DATA_DIR>/<PETSHOP_CART_SLOT>.json`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use petshop_storefront::cart::DEFAULT_CART_SLOT;

mod commands;

#[derive(Parser)]
#[command(name = "petshop-cli")]
#[command(author, version, about = "PetShop cart tools")]
struct Cli {
    /// Directory holding the stored cart
    #[arg(long, global = true, env = "PETSHOP_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Storage slot name for the cart
    #[arg(long, global = true, env = "PETSHOP_CART_SLOT", default_value = DEFAULT_CART_SLOT)]
    slot: String,

    /// Maximum stored cart size in bytes
    #[arg(long, global = true, env = "PETSHOP_STORAGE_QUOTA_BYTES")]
    quota: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart and its totals
    Show {
        /// Print the view model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add one unit of a product
    Add {
        /// Product name; the id is derived from it
        #[arg(short, long)]
        name: String,

        /// Displayed price, e.g. "24,99€"
        #[arg(short, long)]
        price: String,

        /// Image URL
        #[arg(short, long, default_value = "")]
        image: String,

        /// Displayed price before discount
        #[arg(long)]
        original_price: Option<String>,
    },
    /// Remove a line
    Remove {
        /// Product id, e.g. `dog_food`
        id: String,
    },
    /// Set a line's quantity
    Set {
        /// Product id, e.g. `dog_food`
        id: String,

        /// New quantity; zero or below removes the line
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Remove every line
    Clear,
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error + Send + Sync>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let store = commands::cart::StoreOptions {
        data_dir: cli.data_dir,
        slot: cli.slot,
        quota: cli.quota,
    };

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show { json } => commands::cart::show(&store, json).await?,
            CartAction::Add {
                name,
                price,
                image,
                original_price,
            } => {
                commands::cart::add(&store, &name, &price, &image, original_price.as_deref())
                    .await?;
            }
            CartAction::Remove { id } => commands::cart::remove(&store, &id).await?,
            CartAction::Set { id, quantity } => {
                commands::cart::set_quantity(&store, &id, quantity).await?;
            }
            CartAction::Clear => commands::cart::clear(&store).await?,
        },
    }
    Ok(())
}
