use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use merx_api::{app, AppState};
use merx_catalog::inventory::MemoryInventoryLedger;
use merx_catalog::region::RegionCurrencyMap;
use merx_catalog::repository::{MemoryProductCatalog, MemoryRegionPricing};
use merx_catalog::Product;
use merx_core::cache::MemoryCacheCoordinator;
use merx_core::inventory::InventoryLedger;
use merx_order::gateway::MockConfirmationGateway;
use merx_order::repository::MemoryOrderRepository;
use merx_order::OrderOrchestrator;
use merx_store::EventProducer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    products: Arc<MemoryProductCatalog>,
    inventory: Arc<MemoryInventoryLedger>,
}

fn test_app() -> TestApp {
    let products = Arc::new(MemoryProductCatalog::new());
    let inventory = Arc::new(MemoryInventoryLedger::new());
    let pricing = Arc::new(MemoryRegionPricing::new());
    let orders = Arc::new(MemoryOrderRepository::new());
    let gateway = Arc::new(MockConfirmationGateway::new());
    let cache = Arc::new(MemoryCacheCoordinator::new());

    pricing.set_rate("US", dec!(8.25));

    let orchestrator = Arc::new(OrderOrchestrator::new(
        products.clone(),
        inventory.clone(),
        pricing.clone(),
        orders.clone(),
        gateway,
        cache.clone(),
    ));

    let state = AppState {
        orchestrator,
        orders,
        products: products.clone(),
        region_pricing: pricing,
        cache,
        // The producer connects lazily; no broker is needed in tests.
        events: Arc::new(EventProducer::new("localhost:9092").unwrap()),
        currencies: Arc::new(RegionCurrencyMap::builtin()),
    };

    TestApp {
        router: app(state),
        products,
        inventory,
    }
}

impl TestApp {
    fn add_product(&self, name: &str, price: Decimal, stock: i32, region: &str) -> Uuid {
        let product = Product::new(name, price, "USD", stock, "Hydraulics", region);
        let id = product.id;
        self.products.insert(product);
        self.inventory.set_stock(id, stock);
        id
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

fn post_order(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header("content-type", "application/json")
        .header("x-customer-id", "customer-1")
        .header("x-region", "US")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn placing_a_single_order_returns_the_confirmed_order() {
    let app = test_app();
    let product_id = app.add_product("Pressure Valve", dec!(100.00), 10, "US");

    let payload = json!({
        "items": [{ "product_id": product_id, "quantity": 2 }],
        "contact_name": "Dana Meyer",
        "phone_number": "+1-555-0100",
        "delivery_address": "12 Dock Road"
    });
    let (status, body) = app.send(post_order(&payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    let order = &body["order"];
    assert_eq!(order["status"], "CONFIRMED");
    assert_eq!(order["total_price"], json!("216.50"));
    assert_eq!(order["items"][0]["vat_amount"], json!("8.25"));
    assert_eq!(order["phone_number"], json!("+1-555-0100"));
    assert!(order["confirmation_number"].as_str().unwrap().starts_with("CNF-"));

    assert_eq!(app.inventory.stock_level(product_id).await.unwrap(), 8);
}

#[tokio::test]
async fn bulk_payload_returns_per_sub_order_results() {
    let app = test_app();
    let valve = app.add_product("Pressure Valve", dec!(10.00), 10, "US");
    let scarce = app.add_product("Rare Coupling", dec!(25.00), 1, "US");

    let payload = json!({
        "orders": [
            { "items": [{ "product_id": valve, "quantity": 2 }] },
            { "items": [{ "product_id": scarce, "quantity": 5 }] },
            { "items": [{ "product_id": valve, "quantity": 3 }] }
        ]
    });
    let (status, body) = app.send(post_order(&payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_orders"], json!(3));
    assert_eq!(body["successful_orders"], json!(2));
    assert_eq!(body["failed_orders"], json!(1));
    assert_eq!(body["results"][1]["success"], json!(false));
    assert_eq!(body["results"][1]["error"], json!("STOCK_UNAVAILABLE"));
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn payload_without_items_or_orders_is_rejected() {
    let app = test_app();
    let (status, body) = app.send(post_order(&json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("INVALID_ORDER_SHAPE"));
}

#[tokio::test]
async fn missing_identity_headers_are_rejected() {
    let app = test_app();
    let product_id = app.add_product("Pressure Valve", dec!(10.00), 5, "US");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/orders")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "items": [{ "product_id": product_id, "quantity": 1 }] }).to_string(),
        ))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("MISSING_IDENTITY"));
}

#[tokio::test]
async fn insufficient_stock_maps_to_bad_request() {
    let app = test_app();
    let product_id = app.add_product("Pressure Valve", dec!(10.00), 1, "US");

    let payload = json!({ "items": [{ "product_id": product_id, "quantity": 5 }] });
    let (status, body) = app.send(post_order(&payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("INSUFFICIENT_STOCK"));
    // Nothing was deducted.
    assert_eq!(app.inventory.stock_level(product_id).await.unwrap(), 1);
}

#[tokio::test]
async fn order_lookup_round_trips() {
    let app = test_app();
    let product_id = app.add_product("Pressure Valve", dec!(10.00), 5, "US");

    let payload = json!({ "items": [{ "product_id": product_id, "quantity": 1 }] });
    let (_, body) = app.send(post_order(&payload)).await;
    let order_id = body["order"]["order_id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri(format!("/v1/orders/{order_id}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_id"], json!(order_id));

    let request = Request::builder()
        .uri(format!("/v1/orders/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn price_endpoint_reports_rounded_derived_vat() {
    let app = test_app();
    let product_id = app.add_product("Pressure Valve", dec!(19.99), 5, "US");

    let request = Request::builder()
        .uri(format!("/v1/products/{product_id}/price"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    // 19.99 * 8.25% = 1.6492 -> final 21.64, reported VAT = 21.64 - 19.99
    assert_eq!(body["final_price"], json!("21.64"));
    assert_eq!(body["vat_amount"], json!("1.65"));
    assert_eq!(body["base_price"], json!("19.99"));

    // Second read is served from the price cache and must be identical.
    let request = Request::builder()
        .uri(format!("/v1/products/{product_id}/price"))
        .body(Body::empty())
        .unwrap();
    let (_, cached) = app.send(request).await;
    assert_eq!(cached, body);
}

#[tokio::test]
async fn price_for_unknown_product_is_not_found() {
    let app = test_app();
    let request = Request::builder()
        .uri(format!("/v1/products/{}/price", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("PRODUCT_NOT_FOUND"));
}
