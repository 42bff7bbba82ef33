//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog page
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments, or redirects for plain form posts)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit (returns badge fragment)
//! POST /cart/update            - Set quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Placeholder, redirects back to the cart
//!
//! # Anything else
//! *                            - 404 Not Found
//! ```

pub mod cart;
pub mod home;

use axum::{
    Router,
    http::{HeaderMap, Uri},
    routing::{get, post},
};
use chrono::{Datelike, Utc};

use crate::cart::{NOTIFICATION_TTL, Notification};
use crate::error::AppError;
use crate::state::AppState;

/// HTMX event fired after every cart mutation.
pub const CART_UPDATED_TRIGGER: &str = "cart-updated";

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// Notification display data for templates.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub level: &'static str,
    pub message: String,
    /// Milliseconds until the notification should disappear.
    pub dismiss_after_ms: i64,
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        let ttl = i64::try_from(NOTIFICATION_TTL.as_millis()).unwrap_or(i64::MAX);
        let age = (Utc::now() - notification.created_at).num_milliseconds();
        Self {
            level: notification.level.as_str(),
            message: notification.message.clone(),
            dismiss_after_ms: (ttl - age).clamp(0, ttl),
        }
    }
}

/// Drain live notifications into display data.
#[must_use]
pub fn notification_views(state: &AppState) -> Vec<NotificationView> {
    state
        .take_notifications()
        .iter()
        .map(NotificationView::from)
        .collect()
}

/// Data shared by every full page: header, notifications and footer.
#[derive(Debug, Clone)]
pub struct LayoutView {
    pub cart_link: String,
    pub cart_count: u64,
    pub notifications: Vec<NotificationView>,
    pub year: i32,
}

impl LayoutView {
    /// Build the layout for a full page render.
    ///
    /// Pending notifications are consumed.
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        Self {
            cart_link: state.cart_link().href().to_owned(),
            cart_count: state.cart_count(),
            notifications: notification_views(state),
            year: Utc::now().year(),
        }
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog page
        .route("/", get(home::home))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout placeholder
        .route("/checkout", post(cart::checkout))
        .fallback(not_found)
}

/// Fallback for paths no route matches.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}
