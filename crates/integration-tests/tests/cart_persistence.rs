//! Loading stored carts and surviving storage failures.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use petshop_integration_tests::TestApp;
use petshop_storefront::cart::MemoryStore;

#[tokio::test]
async fn test_stored_cart_is_restored() {
    let app = TestApp::with_stored_cart(
        r#"{"version":1,"lines":[
            {"id":"cat_food","name":"Cat Food","price":"19,95€","image":"/static/img/cat-food.svg",
             "quantity":2,"addedAt":"2024-05-01T10:00:00Z"}
        ]}"#,
    );

    assert_eq!(app.state.cart_count(), 2);
    let page = app.get("/cart").await;
    assert!(page.body.contains("Cat Food"));
    assert!(page.body.contains("39.90€"));
}

#[tokio::test]
async fn test_legacy_array_is_restored() {
    let app = TestApp::with_stored_cart(
        r#"[
            {"id":"chew_bone","name":"Chew Bone","price":"6,50€","image":"img/bone.png",
             "quantity":3}
        ]"#,
    );

    assert_eq!(app.state.cart_count(), 3);
}

#[tokio::test]
async fn test_corrupt_cart_starts_empty() {
    let app = TestApp::with_stored_cart("{not json");

    assert_eq!(app.state.cart_count(), 0);
    let page = app.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_bad_lines_are_skipped() {
    let app = TestApp::with_stored_cart(
        r#"{"version":1,"lines":[
            {"id":"chew_bone","name":"Chew Bone","price":"6,50€","image":"","quantity":1},
            {"id":"broken","name":"Broken","price":"n/a","image":"","quantity":1},
            {"name":"No Id"}
        ]}"#,
    );

    assert_eq!(app.state.cart_count(), 1);
}

#[tokio::test]
async fn test_stored_out_of_range_price_is_dropped() {
    let app = TestApp::with_stored_cart(
        r#"{"version":1,"lines":[
            {"id":"gold_bowl","name":"Gold Bowl","price":"79228162514264337593543950335€",
             "image":"","quantity":2},
            {"id":"chew_bone","name":"Chew Bone","price":"6,50€","image":"","quantity":1}
        ]}"#,
    );

    assert_eq!(app.state.cart_count(), 1);
    let page = app.get("/cart").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("11.49€"));
}

#[tokio::test]
async fn test_write_failure_keeps_change_and_warns() {
    let app = TestApp::with_store(MemoryStore::with_quota(16));
    let resp = app.add_product("Dog Food", "24,99€").await;

    // The change is applied in memory even though it was not saved
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.state.cart_count(), 1);
    assert!(app.stored_cart().is_none());
    assert!(resp.body.contains("alert-danger"));
    assert!(resp.body.contains("could not be saved"));
}
