mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

async fn cart_with_items(app: &TestApp, user_id: &str) -> String {
    let cart = read_json(
        app.request(
            Method::POST,
            "/api/v1/carts",
            Some(json!({"userId": user_id})),
        )
        .await,
    )
    .await;
    let id = cart["id"].as_str().unwrap().to_string();

    app.request(
        Method::POST,
        &format!("/api/v1/carts/{}/items", id),
        Some(json!({
            "productId": "p1",
            "productName": "Sneaker",
            "unitPrice": "100",
            "quantity": 2,
            "selectedSize": "42",
            "selectedColor": "black"
        })),
    )
    .await;

    id
}

#[tokio::test]
async fn checkout_converts_cart_into_pending_order() {
    let app = TestApp::new().await;
    let cart_id = cart_with_items(&app, "u1").await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/orders", cart_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = read_json(response).await;
    assert_eq!(order["userId"], "u1");
    assert_eq!(order["total"], "200");
    assert_eq!(order["status"], "pending");
    assert_ne!(order["id"].as_str().unwrap(), cart_id);

    // The cart id is permanently invalid after the conversion.
    let response = app
        .request(Method::GET, &format!("/api/v1/carts/{}", cart_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Checking out the same cart again is NotFound, not a duplicate order.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/orders", cart_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The order carries the immutable line snapshot.
    let order_id = order["id"].as_str().unwrap();
    let fetched = read_json(
        app.request(Method::GET, &format!("/api/v1/orders/{}", order_id), None)
            .await,
    )
    .await;
    let items = fetched["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], "p1");
    assert_eq!(items[0]["unitPrice"], "100");
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[0]["selectedSize"], "42");
}

#[tokio::test]
async fn checkout_of_unknown_cart_is_404() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/orders", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_transitions_follow_the_lifecycle() {
    let app = TestApp::new().await;
    let cart_id = cart_with_items(&app, "u1").await;
    let order = read_json(
        app.request(
            Method::POST,
            &format!("/api/v1/carts/{}/orders", cart_id),
            None,
        )
        .await,
    )
    .await;
    let status_uri = format!("/api/v1/orders/{}/status", order["id"].as_str().unwrap());

    // Re-asserting the current status is a no-op success.
    let response = app
        .request(Method::PUT, &status_uri, Some(json!({"status": "pending"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // pending -> completed is allowed.
    let response = app
        .request(
            Method::PUT,
            &status_uri,
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "completed");

    // Walking backwards is rejected.
    let response = app
        .request(Method::PUT, &status_uri, Some(json!({"status": "pending"})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown status names are rejected before any lookup.
    let response = app
        .request(Method::PUT, &status_uri, Some(json!({"status": "shipped"})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // completed -> refunded closes the lifecycle.
    let response = app
        .request(
            Method::PUT,
            &status_uri,
            Some(json!({"status": "refunded"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "refunded");
}

#[tokio::test]
async fn status_update_on_missing_order_is_404() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{}/status", Uuid::new_v4()),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_orders_come_back_most_recent_first() {
    let app = TestApp::new().await;

    let first_cart = cart_with_items(&app, "u1").await;
    let first = read_json(
        app.request(
            Method::POST,
            &format!("/api/v1/carts/{}/orders", first_cart),
            None,
        )
        .await,
    )
    .await;

    // Keep the two created_at values apart.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let second_cart = cart_with_items(&app, "u1").await;
    let second = read_json(
        app.request(
            Method::POST,
            &format!("/api/v1/carts/{}/orders", second_cart),
            None,
        )
        .await,
    )
    .await;

    let orders = read_json(
        app.request(Method::GET, "/api/v1/users/u1/orders", None)
            .await,
    )
    .await;
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], second["id"]);
    assert_eq!(orders[1]["id"], first["id"]);

    // A user with no orders gets an empty list, not an error.
    let response = app
        .request(Method::GET, "/api/v1/users/nobody/orders", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_order_is_404() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{}", Uuid::new_v4()), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
