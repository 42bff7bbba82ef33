//! Cart routes: HTMX fragments, plain form posts and persistence.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use petshop_integration_tests::TestApp;

#[tokio::test]
async fn test_htmx_add_returns_badge_and_trigger() {
    let app = TestApp::new();
    let resp = app.add_product("Dog Food", "24,99€").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("HX-Trigger"), Some("cart-updated"));
    assert!(resp.body.contains(r#"id="cart-count""#));
    assert!(resp.body.contains(">1</span>"));
    assert!(resp.body.contains("Dog Food added to cart!"));
    assert!(resp.body.contains("alert-success"));
}

#[tokio::test]
async fn test_add_persists_versioned_cart() {
    let app = TestApp::new();
    app.add_product("Dog Food", "24,99€").await;
    app.add_product("Dog Food", "24,99€").await;

    let stored = app.stored_cart().unwrap();
    assert_eq!(stored["version"], 1);
    let lines = stored["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["id"], "dog_food");
    assert_eq!(lines[0]["price"], "24,99€");
    assert_eq!(lines[0]["quantity"], 2);
    assert!(lines[0]["addedAt"].is_string());
}

#[tokio::test]
async fn test_cart_page_totals() {
    let app = TestApp::new();
    app.add_product("Dog Food", "24,99€").await;
    app.add_product("Dog Food", "24,99€").await;

    let resp = app.get("/cart").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("2 units"));
    assert!(resp.body.contains("49.98€"));
    assert!(resp.body.contains("4.99€"));
    assert!(resp.body.contains("54.97€"));
    assert!(resp.body.contains("Add 0.02€ more for free shipping"));
}

#[tokio::test]
async fn test_free_shipping_at_threshold() {
    let app = TestApp::new();
    app.add_product("Cat Scratcher", "34,00€").await;
    app.add_product("Cat Food", "19,95€").await;

    let resp = app.get("/cart").await;
    assert!(resp.body.contains("53.95€"));
    assert!(resp.body.contains("Free shipping! Order ≥ 50.00€"));
    assert!(app.state.with_cart(|cart| cart.shipping_quote().is_free));
}

#[tokio::test]
async fn test_empty_cart_page() {
    let app = TestApp::new();
    let resp = app.get("/cart").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Your cart is empty."));
    assert!(resp.body.contains("0.00€"));
    assert!(resp.body.contains("disabled>Checkout"));
}

#[tokio::test]
async fn test_plain_add_redirects_back() {
    let app = TestApp::new();
    let resp = app
        .post_form(
            "/cart/add",
            &[("name", "Chew Bone"), ("price", "6,50€"), ("return_to", "/")],
        )
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/"));
    assert_eq!(app.state.cart_count(), 1);
}

#[tokio::test]
async fn test_plain_add_ignores_foreign_return_to() {
    let app = TestApp::new();
    let resp = app
        .post_form(
            "/cart/add",
            &[
                ("name", "Chew Bone"),
                ("price", "6,50€"),
                ("return_to", "https://evil.example.com/"),
            ],
        )
        .await;

    assert_eq!(resp.header("location"), Some("/"));
}

#[tokio::test]
async fn test_invalid_price_is_rejected() {
    let app = TestApp::new();
    let resp = app.add_product("Mystery Box", "ask us").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(app.stored_cart().is_none());
    assert_eq!(app.state.cart_count(), 0);

    // The danger notification shows up on the next page
    let page = app.get("/").await;
    assert!(page.body.contains("alert-danger"));
    assert!(page.body.contains("Mystery Box could not be added"));
}

#[tokio::test]
async fn test_out_of_range_price_is_rejected() {
    let app = TestApp::new();

    for _ in 0..2 {
        let resp = app
            .add_product("Gold Bowl", "79228162514264337593543950335€")
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    }

    assert!(app.stored_cart().is_none());
    let page = app.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_foreign_currency_price_is_rejected() {
    let app = TestApp::new();
    app.add_product("Dog Leash", "25,00€").await;

    let resp = app.add_product("Import Toy", "$30").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.state.cart_count(), 1);
    let page = app.get("/cart").await;
    assert!(page.body.contains("29.99€"));
    assert!(!page.body.contains("Free shipping!"));
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let app = TestApp::new();
    let resp = app.add_product("   ", "1,00€").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_quantity_fragment() {
    let app = TestApp::new();
    app.add_product("Dog Leash", "12,90€").await;

    let resp = app
        .post_htmx("/cart/update", &[("id", "dog_leash"), ("quantity", "3")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("HX-Trigger"), Some("cart-updated"));
    assert!(resp.body.contains("3 units"));
    assert!(resp.body.contains("38.70€"));
    assert_eq!(app.stored_cart().unwrap()["lines"][0]["quantity"], 3);
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let app = TestApp::new();
    app.add_product("Dog Leash", "12,90€").await;

    let resp = app
        .post_htmx("/cart/update", &[("id", "dog_leash"), ("quantity", "0")])
        .await;

    assert!(resp.body.contains("Your cart is empty."));
    assert!(resp.body.contains("Dog Leash removed from cart"));
    assert_eq!(app.stored_cart().unwrap()["lines"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_update_rejects_bad_input() {
    let app = TestApp::new();
    app.add_product("Dog Leash", "12,90€").await;

    let resp = app
        .post_htmx("/cart/update", &[("id", "dog_leash"), ("quantity", "two")])
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .post_htmx("/cart/update", &[("id", "Dog Leash"), ("quantity", "2")])
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_unknown_id_is_noop() {
    let app = TestApp::new();
    let resp = app
        .post_htmx("/cart/update", &[("id", "ghost"), ("quantity", "2")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(app.stored_cart().is_none());
}

#[tokio::test]
async fn test_quantity_is_capped() {
    let app = TestApp::new();
    app.add_product("Feather Toy", "4,75€").await;

    let resp = app
        .post_htmx("/cart/update", &[("id", "feather_toy"), ("quantity", "500")])
        .await;

    assert!(resp.body.contains("99 units"));
    assert!(resp.body.contains("limited to 99 units"));
}

#[tokio::test]
async fn test_remove_and_plain_redirect() {
    let app = TestApp::new();
    app.add_product("Chew Bone", "6,50€").await;
    app.add_product("Dog Leash", "12,90€").await;

    let resp = app.post_form("/cart/remove", &[("id", "chew_bone")]).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/cart"));

    let page = app.get("/cart").await;
    assert!(!page.body.contains("line-chew_bone"));
    assert!(page.body.contains("line-dog_leash"));
    assert!(page.body.contains("Chew Bone removed from cart"));
    assert_eq!(app.state.cart_count(), 1);
}

#[tokio::test]
async fn test_clear() {
    let app = TestApp::new();
    app.add_product("Chew Bone", "6,50€").await;
    app.add_product("Dog Leash", "12,90€").await;

    let resp = app.post_htmx("/cart/clear", &[]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Your cart is empty."));
    assert!(resp.body.contains("Cart emptied"));
    assert_eq!(app.state.cart_count(), 0);
}

#[tokio::test]
async fn test_clear_asks_for_confirmation() {
    let app = TestApp::new();
    app.add_product("Chew Bone", "6,50€").await;

    let page = app.get("/cart").await;

    assert!(page.body.contains(r#"hx-post="/cart/clear""#));
    assert!(page.body.contains(r#"hx-confirm="Empty your cart?""#));
}

#[tokio::test]
async fn test_count_fragment() {
    let app = TestApp::new();
    app.add_product("Chew Bone", "6,50€").await;
    app.add_product("Chew Bone", "6,50€").await;
    app.add_product("Feather Toy", "4,75€").await;

    let resp = app.get("/cart/count").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(">3</span>"));
}

#[tokio::test]
async fn test_checkout_is_a_placeholder() {
    let app = TestApp::new();
    app.add_product("Chew Bone", "6,50€").await;

    let resp = app.post_form("/checkout", &[]).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/cart"));

    let page = app.get("/cart").await;
    assert!(page.body.contains("Checkout is not available yet"));
    // Nothing was bought
    assert_eq!(app.state.cart_count(), 1);
}
