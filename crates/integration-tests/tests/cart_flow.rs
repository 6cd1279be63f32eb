//! Integration tests for cart operations.
//!
//! Every cart route requires a bearer token, so each test first runs the
//! login flow through the real handlers.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use mercato_integration_tests::TestContext;

#[tokio::test]
async fn test_cart_requires_token() {
    let ctx = TestContext::new();

    for (method, path) in [
        ("GET", "/cart"),
        ("POST", "/cart/add"),
        ("DELETE", "/cart/remove/p1"),
        ("PATCH", "/cart/update/p1"),
    ] {
        let (status, body) = ctx.request(method, path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(body["error"], "Access denied, no token provided");
    }
}

#[tokio::test]
async fn test_cart_rejects_bad_token() {
    let ctx = TestContext::new();

    let (status, body) = ctx.request("GET", "/cart", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_new_user_has_empty_cart() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    let (status, body) = ctx.request("GET", "/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_add_and_list() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    let (status, body) = ctx
        .request(
            "POST",
            "/cart/add",
            Some(&token),
            Some(json!({ "product": { "id": "p1", "name": "Keyboard", "price": 49.9 } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product added to cart");

    let (status, body) = ctx.request("GET", "/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], "p1");
    assert_eq!(entries[0]["quantity"], 1);
    // Extra product fields are stored verbatim on the entry
    assert_eq!(entries[0]["name"], "Keyboard");
    assert_eq!(entries[0]["price"], 49.9);
}

#[tokio::test]
async fn test_add_requires_product() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    let (status, body) = ctx
        .request("POST", "/cart/add", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product data required");
}

#[tokio::test]
async fn test_duplicate_add_conflicts() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/cart/add",
            Some(&token),
            Some(json!({ "product": { "id": "p1" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .request(
            "POST",
            "/cart/add",
            Some(&token),
            Some(json!({ "product": { "id": "p1" } })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Product already in cart");

    // The cart still holds a single entry
    let (_, body) = ctx.request("GET", "/cart", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_product() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    for id in ["p1", "p2"] {
        let (status, _) = ctx
            .request(
                "POST",
                "/cart/add",
                Some(&token),
                Some(json!({ "product": { "id": id } })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = ctx
        .request("DELETE", "/cart/remove/p1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product removed from cart");

    let cart = body["cart"].as_array().unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0]["id"], "p2");
}

#[tokio::test]
async fn test_remove_missing_product() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/cart/add",
            Some(&token),
            Some(json!({ "product": { "id": "p1" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .request("DELETE", "/cart/remove/p9", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found in cart");

    // Existing entries are untouched
    let (_, body) = ctx.request("GET", "/cart", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_hex_ids_are_canonicalized() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    // 24-hex identifiers are lowercased at the boundary, so any case
    // variant of the same object id addresses the same entry
    let (status, _) = ctx
        .request(
            "POST",
            "/cart/add",
            Some(&token),
            Some(json!({ "product": { "id": "507F1F77BCF86CD799439011" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.request("GET", "/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "507f1f77bcf86cd799439011");

    let (status, body) = ctx
        .request(
            "POST",
            "/cart/add",
            Some(&token),
            Some(json!({ "product": { "id": "507f1f77bcf86cd799439011" } })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Product already in cart");

    let (status, body) = ctx
        .request(
            "DELETE",
            "/cart/remove/507F1F77BCF86CD799439011",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"], json!([]));
}

#[tokio::test]
async fn test_update_quantity() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    for id in ["p1", "p2"] {
        let (status, _) = ctx
            .request(
                "POST",
                "/cart/add",
                Some(&token),
                Some(json!({ "product": { "id": id } })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = ctx
        .request(
            "PATCH",
            "/cart/update/p1",
            Some(&token),
            Some(json!({ "quantity": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Quantity updated");

    let cart = body["cart"].as_array().unwrap();
    assert_eq!(cart.len(), 2);
    for entry in cart {
        match entry["id"].as_str().unwrap() {
            "p1" => assert_eq!(entry["quantity"], 5),
            "p2" => assert_eq!(entry["quantity"], 1),
            other => panic!("unexpected entry {other}"),
        }
    }
}

#[tokio::test]
async fn test_update_quantity_missing_entry() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    let (status, body) = ctx
        .request(
            "PATCH",
            "/cart/update/p9",
            Some(&token),
            Some(json!({ "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found in cart");
}

#[tokio::test]
async fn test_update_quantity_rejects_zero() {
    let ctx = TestContext::new();
    let token = ctx.login("a@x.com").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/cart/add",
            Some(&token),
            Some(json!({ "product": { "id": "p1" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .request(
            "PATCH",
            "/cart/update/p1",
            Some(&token),
            Some(json!({ "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Quantity must be at least 1");

    // The stored quantity is unchanged
    let (_, body) = ctx.request("GET", "/cart", Some(&token), None).await;
    assert_eq!(body[0]["quantity"], 1);
}

#[tokio::test]
async fn test_carts_are_isolated_per_user() {
    let ctx = TestContext::new();
    let token_a = ctx.login("a@x.com").await;
    let token_b = ctx.login("b@x.com").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/cart/add",
            Some(&token_a),
            Some(json!({ "product": { "id": "p1" } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.request("GET", "/cart", Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
