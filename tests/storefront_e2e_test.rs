mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use serde_json::json;

/// The whole storefront flow for one user: empty cart, one line, checkout,
/// pay, refund.
#[tokio::test]
async fn full_purchase_flow() {
    let app = TestApp::new().await;

    // Start a checkout session.
    let cart = read_json(
        app.request(Method::POST, "/api/v1/carts", Some(json!({"userId": "u1"})))
            .await,
    )
    .await;
    let cart_id = cart["id"].as_str().unwrap().to_string();

    // Two sneakers at 100 each.
    let cart = read_json(
        app.request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", cart_id),
            Some(json!({
                "productId": "p1",
                "productName": "Sneaker",
                "unitPrice": "100",
                "quantity": 2,
                "selectedSize": "42",
                "selectedColor": "white"
            })),
        )
        .await,
    )
    .await;
    assert_eq!(cart["total"], "200");

    // Checkout.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/carts/{}/orders", cart_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = read_json(response).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["total"], "200");
    assert_eq!(order["status"], "pending");

    // The cart is gone.
    let response = app
        .request(Method::GET, &format!("/api/v1/carts/{}", cart_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Pay with a valid card.
    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "orderId": order_id,
                "amount": "200",
                "cardNumber": "4532015112830366",
                "cardHolder": "Jo Customer",
                "expiryDate": "11/2030",
                "cvv": "4321"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    let payment = &body["payment"];
    assert_eq!(payment["status"], "completed");
    assert_eq!(payment["cardLastFour"], "0366");
    assert_eq!(payment["amount"], "200");
    let payment_id = payment["id"].as_str().unwrap().to_string();

    // Mark the order completed, then refund both sides.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{}/status", order_id),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/payments/{}/refund", payment_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "refunded");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/orders/{}/status", order_id),
            Some(json!({"status": "refunded"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The order snapshot is unchanged by everything that happened after
    // checkout.
    let fetched = read_json(
        app.request(Method::GET, &format!("/api/v1/orders/{}", order_id), None)
            .await,
    )
    .await;
    assert_eq!(fetched["total"], "200");
    assert_eq!(fetched["status"], "refunded");
    let items = fetched["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], "p1");
    assert_eq!(items[0]["quantity"], 2);

    // The user's order history shows the one order.
    let orders = read_json(
        app.request(Method::GET, "/api/v1/users/u1/orders", None)
            .await,
    )
    .await;
    assert_eq!(orders.as_array().unwrap().len(), 1);

    // Health endpoint reports the database is reachable.
    let response = app.request(Method::GET, "/api/v1/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
