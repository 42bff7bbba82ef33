//! Integration tests for the PetShop storefront.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`;
//! no server or network is involved. The cart is backed by a shared
//! [`MemoryStore`] so tests can inspect exactly what was persisted.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p petshop-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use petshop_storefront::cart::{DEFAULT_CART_SLOT, KeyValueStore, MemoryStore};
use petshop_storefront::catalog::Catalog;
use petshop_storefront::config::StorefrontConfig;
use petshop_storefront::state::AppState;
use tower::ServiceExt;

/// Static assets of the storefront crate.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../storefront/static");

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Value of a response header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// An in-process storefront with an inspectable cart store.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// A storefront with an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// A storefront whose cart slot already holds `raw`.
    #[must_use]
    pub fn with_stored_cart(raw: &str) -> Self {
        Self::with_store(MemoryStore::with_entry(DEFAULT_CART_SLOT, raw))
    }

    /// A storefront over a custom store.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration fails to load.
    #[must_use]
    pub fn with_store(store: MemoryStore) -> Self {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "PETSHOP_STATIC_DIR").then(|| STATIC_DIR.to_string())
        })
        .expect("default configuration is valid");

        let store = Arc::new(store);
        let state = AppState::new(config, Arc::clone(&store), Catalog::builtin());
        let router = petshop_storefront::app(state.clone());

        Self {
            router,
            state,
            store,
        }
    }

    /// Raw JSON currently persisted in the cart slot.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be read or holds invalid UTF-8.
    #[must_use]
    pub fn stored_cart(&self) -> Option<serde_json::Value> {
        self.store
            .get(DEFAULT_CART_SLOT)
            .expect("memory store reads never fail")
            .map(|bytes| serde_json::from_slice(&bytes).expect("stored cart is JSON"))
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::get(uri)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// Send a plain form POST, as a browser without JavaScript would.
    pub async fn post_form(&self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(form_request(uri, form, false)).await
    }

    /// Send a form POST issued by HTMX.
    pub async fn post_htmx(&self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send(form_request(uri, form, true)).await
    }

    /// Add one unit of a catalog product via HTMX.
    pub async fn add_product(&self, name: &str, price: &str) -> TestResponse {
        self.post_htmx(
            "/cart/add",
            &[("name", name), ("price", price), ("image", "/static/img/p.svg")],
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body can be read");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn form_request(uri: &str, form: &[(&str, &str)], htmx: bool) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish();

    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if htmx {
        builder = builder.header("HX-Request", "true");
    }
    builder.body(Body::from(body)).expect("valid request")
}
