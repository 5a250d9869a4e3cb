use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OrderConfirmedEvent {
    pub order_id: Uuid,
    pub customer_id: String,
    pub region: String,
    pub total_price: Decimal,
    pub confirmation_number: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct StockAdjustedEvent {
    pub product_id: Uuid,
    pub delta: i32,
    pub timestamp: i64,
}
