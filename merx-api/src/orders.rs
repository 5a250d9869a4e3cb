use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use merx_order::models::{BulkOrderOutcome, Order, OrderLineRequest, OrderRequest, OrderStatus};
use merx_shared::models::events::{OrderConfirmedEvent, StockAdjustedEvent};
use merx_shared::pii::Masked;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Flexible order payload: `items` for a single order, `orders` for a bulk
/// submission. Exactly one of the two must be present and non-empty.
#[derive(Debug, Deserialize)]
pub struct CreateOrderPayload {
    pub items: Option<Vec<OrderLineRequest>>,
    pub orders: Option<Vec<SubOrderPayload>>,
    pub contact_name: Option<String>,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubOrderPayload {
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub customer_id: String,
    pub region: String,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub confirmation_number: Option<String>,
    pub contact_name: Option<String>,
    pub phone_number: Option<Masked<String>>,
    pub delivery_address: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub region: String,
    pub vat_percentage: Decimal,
    pub vat_amount: Decimal,
    pub final_price: Decimal,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            customer_id: order.customer_id,
            region: order.region,
            status: order.status,
            total_price: order.total_price,
            confirmation_number: order.confirmation_number,
            contact_name: order.contact_name,
            phone_number: order.phone_number.map(Masked),
            delivery_address: order.delivery_address,
            items: order
                .lines
                .into_iter()
                .map(|line| OrderItemResponse {
                    product_id: line.product_id,
                    product_name: line.product_name,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    region: line.region,
                    vat_percentage: line.vat_percentage,
                    vat_amount: line.vat_amount,
                    final_price: line.final_price,
                })
                .collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Either a single order or a bulk outcome, mirroring the payload shape.
#[derive(Debug, Serialize)]
pub struct OrderResponseWrapper {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<OrderResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_orders: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_orders: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<OrderResultResponse>>,
}

#[derive(Debug, Serialize)]
pub struct OrderResultResponse {
    pub order_index: usize,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResponse>,
}

impl OrderResponseWrapper {
    fn single(order: Order) -> Self {
        Self {
            order: Some(order.into()),
            orders: None,
            total_orders: None,
            successful_orders: None,
            failed_orders: None,
            results: None,
        }
    }

    fn bulk(outcome: BulkOrderOutcome) -> Self {
        let successes: Vec<OrderResponse> = outcome
            .results
            .iter()
            .filter_map(|r| r.order.clone())
            .map(OrderResponse::from)
            .collect();

        Self {
            order: None,
            orders: Some(successes),
            total_orders: Some(outcome.total_orders),
            successful_orders: Some(outcome.successful_orders),
            failed_orders: Some(outcome.failed_orders),
            results: Some(
                outcome
                    .results
                    .into_iter()
                    .map(|r| OrderResultResponse {
                        order_index: r.order_index,
                        success: r.success,
                        message: r.message,
                        error: r.error,
                        order: r.order.map(OrderResponse::from),
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub region: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// The upstream gateway authenticates the caller and forwards the validated
/// identity in these headers; this service trusts them as given.
fn identity(headers: &HeaderMap) -> Result<(String, String), AppError> {
    let customer_id = header_value(headers, "x-customer-id")?;
    let region = header_value(headers, "x-region")?;
    Ok((customer_id, region))
}

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<String, AppError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::bad_request("MISSING_IDENTITY", format!("missing {name} header")))
}

/// POST /v1/orders
/// Place a single order or a bulk batch of independent sub-orders.
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<(StatusCode, Json<OrderResponseWrapper>), AppError> {
    let (customer_id, region) = identity(&headers)?;

    if let Some(orders) = payload.orders.filter(|orders| !orders.is_empty()) {
        let sub_orders = orders
            .into_iter()
            .map(|sub| OrderRequest::of_items(sub.items))
            .collect();

        let outcome = state
            .orchestrator
            .place_orders(sub_orders, &customer_id, &region)
            .await;

        for order in outcome.successes() {
            publish_confirmed(&state, order).await;
        }

        return Ok((StatusCode::OK, Json(OrderResponseWrapper::bulk(outcome))));
    }

    if let Some(items) = payload.items.filter(|items| !items.is_empty()) {
        let request = OrderRequest {
            items,
            contact_name: payload.contact_name,
            phone_number: payload.phone_number,
            delivery_address: payload.delivery_address,
        };

        let order = state
            .orchestrator
            .place_order(request, &customer_id, &region)
            .await?;
        publish_confirmed(&state, &order).await;

        return Ok((
            StatusCode::CREATED,
            Json(OrderResponseWrapper::single(order)),
        ));
    }

    Err(AppError::bad_request(
        "INVALID_ORDER_SHAPE",
        "order payload must contain either 'items' or 'orders'",
    ))
}

/// GET /v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .get_order(order_id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found("ORDER_NOT_FOUND", format!("order not found: {order_id}")))?;

    Ok(Json(order.into()))
}

/// GET /v1/orders
/// The caller's own orders, or all orders in a region when `?region=` is set.
pub async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = match query.region {
        Some(region) => state
            .orders
            .list_orders_by_region(&region)
            .await
            .map_err(AppError::internal)?,
        None => {
            let (customer_id, _) = identity(&headers)?;
            state
                .orders
                .list_orders(&customer_id)
                .await
                .map_err(AppError::internal)?
        }
    };

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

async fn publish_confirmed(state: &AppState, order: &Order) {
    let timestamp = chrono::Utc::now().timestamp();

    let event = OrderConfirmedEvent {
        order_id: order.id,
        customer_id: order.customer_id.clone(),
        region: order.region.clone(),
        total_price: order.total_price,
        confirmation_number: order.confirmation_number.clone().unwrap_or_default(),
        timestamp,
    };
    if let Err(err) = state.events.publish_order_confirmed(&event).await {
        tracing::warn!("Failed to publish confirmation event for order {}: {}", order.id, err);
    }

    for line in &order.lines {
        let event = StockAdjustedEvent {
            product_id: line.product_id,
            delta: -line.quantity,
            timestamp,
        };
        if let Err(err) = state.events.publish_stock_adjusted(&event).await {
            tracing::warn!(
                "Failed to publish stock event for product {}: {}",
                line.product_id,
                err
            );
        }
    }
}
