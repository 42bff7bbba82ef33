//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Requests without the `HX-Request` header are plain form posts and get a
//! redirect instead of a fragment, so the pages also work without JavaScript.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use petshop_core::{NewLine, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::cart::{CartView, Notification};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::navigation::local_path_or;
use crate::state::AppState;

use super::{CART_UPDATED_TRIGGER, LayoutView, NotificationView, is_htmx, notification_views};

/// Add to cart form data, as submitted by a product card.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub original_price: Option<String>,
    /// Page to return to after a plain form post.
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    /// Raw text, parsed by the handler.
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: LayoutView,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub notifications: Vec<NotificationView>,
}

/// Badge fragment returned after adding a product (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub count: u64,
    pub notifications: Vec<NotificationView>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

fn parse_id(raw: &str) -> Result<ProductId> {
    ProductId::parse(raw.trim()).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Respond to a cart page mutation: the refreshed cart fragment for HTMX, a
/// redirect to the cart page otherwise.
async fn cart_changed(state: &AppState, headers: &HeaderMap) -> Result<Response> {
    if !is_htmx(headers) {
        return Ok(Redirect::to(state.cart_link().href()).into_response());
    }

    let cart = state.run_cart(|cart| cart.view()).await?;
    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_TRIGGER)]),
        CartItemsTemplate {
            cart,
            notifications: notification_views(state),
        },
    )
        .into_response())
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let cart = state.run_cart(|cart| cart.view()).await?;

    Ok(CartShowTemplate {
        layout: LayoutView::from_state(&state),
        cart,
    })
}

/// Add one unit of a product to the cart.
///
/// Returns the badge fragment with an HTMX trigger so other cart elements
/// refresh, or redirects back to the submitting page.
#[instrument(skip(state, headers))]
pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = NewLine::from_card(
        &form.name,
        &form.price,
        &form.image,
        form.original_price.as_deref(),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    add_breadcrumb("cart", "Add to cart", Some(&[("product_id", product.id.as_str())]));
    let result = state.run_cart(move |cart| cart.add_line(&product)).await?;

    if !is_htmx(&headers) {
        // The danger notification is shown on the page we return to
        let back = local_path_or(form.return_to.as_deref(), "/");
        return Ok(Redirect::to(back).into_response());
    }

    result?;

    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_TRIGGER)]),
        CartAddedTemplate {
            count: state.cart_count(),
            notifications: notification_views(&state),
        },
    )
        .into_response())
}

/// Set a line's quantity; zero or below removes the line.
#[instrument(skip(state, headers))]
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let id = parse_id(&form.id)?;
    let quantity: i64 = form
        .quantity
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid quantity: {:?}", form.quantity)))?;

    add_breadcrumb("cart", "Update quantity", Some(&[("product_id", id.as_str())]));
    state
        .run_cart(move |cart| cart.set_quantity(&id, quantity))
        .await?;

    cart_changed(&state, &headers).await
}

/// Remove a line from the cart.
#[instrument(skip(state, headers))]
pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let id = parse_id(&form.id)?;

    add_breadcrumb("cart", "Remove from cart", Some(&[("product_id", id.as_str())]));
    state.run_cart(move |cart| cart.remove_line(&id)).await?;

    cart_changed(&state, &headers).await
}

/// Empty the cart.
#[instrument(skip(state, headers))]
pub async fn clear(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    add_breadcrumb("cart", "Clear cart", None);
    state.run_cart(|cart| cart.clear()).await?;

    cart_changed(&state, &headers).await
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    CartCountTemplate {
        count: state.cart_count(),
    }
}

/// Checkout placeholder.
///
/// There is no order processing; the shopper is sent back to the cart with a
/// notice.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Result<Response> {
    let empty = state.run_cart(|cart| cart.is_empty()).await?;
    let notice = if empty {
        Notification::info("Your cart is empty")
    } else {
        Notification::info("Checkout is not available yet")
    };
    state.notify(notice);

    Ok(Redirect::to(state.cart_link().href()).into_response())
}
