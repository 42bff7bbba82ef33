//! Durable storage for the cart.
//!
//! Two layers:
//!
//! - [`KeyValueStore`] - a byte-oriented key-value store. [`FileStore`] keeps
//!   one file per key in a data directory; [`MemoryStore`] keeps everything in
//!   memory for tests.
//! - [`CartRepository`] - reads and writes the cart as JSON in one named slot.
//!
//! # Stored Format
//!
//! ```json
//! { "version": 1, "lines": [ { "id": "dog_food", "name": "Dog Food", ... } ] }
//! ```
//!
//! A bare JSON array of lines (the unversioned format written by the original
//! browser script) is still accepted and is rewritten in the versioned form on
//! the next save.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use petshop_core::{Cart, CartLine, MAX_LINE_QUANTITY, PriceTag, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Current version of the stored cart format.
pub const CART_SCHEMA_VERSION: u32 = 1;

/// Default storage slot for the cart.
pub const DEFAULT_CART_SLOT: &str = "petshop_cart";

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the value would exceed the configured storage quota.
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Bytes the write needed.
        needed: u64,
        /// Bytes the store allows.
        quota: u64,
    },

    /// The key cannot be used as a slot name.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The cart could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A durable key-value byte store.
///
/// Methods take `&self`; implementations use interior mutability where they
/// need it.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value. Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or fully overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written, including when it
    /// would exceed the store's quota.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }
}

fn check_quota(quota: Option<u64>, len: usize) -> Result<(), StoreError> {
    let needed = u64::try_from(len).unwrap_or(u64::MAX);
    match quota {
        Some(quota) if needed > quota => Err(StoreError::QuotaExceeded { needed, quota }),
        _ => Ok(()),
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-memory store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    quota: Option<u64>,
}

impl MemoryStore {
    /// Create an empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects values larger than `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: u64) -> Self {
        Self {
            entries: Mutex::default(),
            quota: Some(quota),
        }
    }

    /// Create a store pre-populated with one raw value.
    #[must_use]
    pub fn with_entry(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.into());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        check_quota(self.quota, value.len())?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_vec());
        Ok(())
    }
}

// =============================================================================
// File Store
// =============================================================================

/// One JSON file per key under a data directory.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    /// Reject values larger than `quota` bytes.
    #[must_use]
    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        check_quota(self.quota, value.len())?;

        std::fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote storage slot");
        Ok(())
    }
}

// =============================================================================
// Cart Repository
// =============================================================================

#[derive(Serialize)]
struct StoredCartRef<'a> {
    version: u32,
    lines: &'a [CartLine],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCart {
    Versioned {
        version: u32,
        lines: Vec<serde_json::Value>,
    },
    Legacy(Vec<serde_json::Value>),
}

/// A stored line, read leniently.
///
/// The unversioned format could hold a missing or non-positive quantity
/// (`null` after a failed number parse); such lines are dropped on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLine {
    id: ProductId,
    name: String,
    price: PriceTag,
    #[serde(default)]
    original_price: Option<String>,
    #[serde(default)]
    image: String,
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(default)]
    added_at: Option<DateTime<Utc>>,
}

impl StoredLine {
    fn into_line(self, loaded_at: DateTime<Utc>) -> Option<CartLine> {
        let quantity = u32::try_from(self.quantity?).ok().filter(|q| *q > 0)?;
        Some(CartLine {
            id: self.id,
            name: self.name,
            price: self.price,
            original_price: self.original_price,
            image: self.image,
            quantity: quantity.min(MAX_LINE_QUANTITY),
            added_at: self.added_at.unwrap_or(loaded_at),
        })
    }
}

/// Reads and writes the cart in one named storage slot.
pub struct CartRepository {
    store: Box<dyn KeyValueStore>,
    slot: String,
}

impl CartRepository {
    /// Create a repository over `store`, using `slot` as the key.
    pub fn new(store: impl KeyValueStore + 'static, slot: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            slot: slot.into(),
        }
    }

    /// The storage slot name.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Load the stored cart.
    ///
    /// Never fails: a missing slot, unreadable storage, malformed JSON or an
    /// unknown format version all load as an empty cart. Individual lines that
    /// cannot be read are skipped.
    #[must_use]
    pub fn load(&self) -> Cart {
        let bytes = match self.store.get(&self.slot) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Cart::new(),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to read stored cart, starting empty");
                return Cart::new();
            }
        };

        let lines = match serde_json::from_slice::<StoredCart>(&bytes) {
            Ok(StoredCart::Versioned { version, lines }) if version == CART_SCHEMA_VERSION => {
                lines
            }
            Ok(StoredCart::Versioned { version, .. }) => {
                warn!(slot = %self.slot, version, "Unknown stored cart version, starting empty");
                return Cart::new();
            }
            Ok(StoredCart::Legacy(lines)) => {
                debug!(slot = %self.slot, "Loaded unversioned cart");
                lines
            }
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Stored cart is malformed, starting empty");
                return Cart::new();
            }
        };

        let loaded_at = Utc::now();
        let total = lines.len();
        let lines: Vec<CartLine> = lines
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<StoredLine>(value) {
                Ok(line) => line.into_line(loaded_at),
                Err(e) => {
                    warn!(slot = %self.slot, error = %e, "Skipping unreadable cart line");
                    None
                }
            })
            .collect();

        if lines.len() < total {
            warn!(
                slot = %self.slot,
                kept = lines.len(),
                dropped = total - lines.len(),
                "Dropped invalid stored cart lines"
            );
        }

        Cart::from_lines(lines)
    }

    /// Serialize the full cart and overwrite the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying write fails.
    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        let stored = StoredCartRef {
            version: CART_SCHEMA_VERSION,
            lines: cart.lines(),
        };
        let bytes = serde_json::to_vec(&stored)?;
        self.store.put(&self.slot, &bytes)
    }
}

impl std::fmt::Debug for CartRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartRepository")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
