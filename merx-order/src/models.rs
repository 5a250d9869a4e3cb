use chrono::{DateTime, Utc};
use merx_catalog::pricing::{PriceQuote, PricingError};
use merx_catalog::Product;
use merx_core::inventory::InventoryError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle. CONFIRMED is terminal; a failed order leaves no durable
/// record at all, so there is no persisted failure state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Confirmed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Confirmed => "CONFIRMED",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// A customer's purchase in one region.
///
/// `total_price` is always the sum of the line final prices; lines are
/// rounded individually and no cross-line correction is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: String,
    pub region: String,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub confirmation_number: Option<String>,
    pub contact_name: Option<String>,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: impl Into<String>, region: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id: customer_id.into(),
            region: region.into(),
            status: OrderStatus::Created,
            total_price: Decimal::ZERO,
            confirmation_number: None,
            contact_name: None,
            phone_number: None,
            delivery_address: None,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_line(&mut self, line: OrderLine) {
        self.total_price += line.final_price;
        self.lines.push(line);
        self.updated_at = Utc::now();
    }

    /// Terminal transition once the external authority has acknowledged the
    /// order.
    pub fn confirm(&mut self, confirmation_number: String) {
        self.confirmation_number = Some(confirmation_number);
        self.status = OrderStatus::Confirmed;
        self.updated_at = Utc::now();
    }
}

/// One priced product position on an order. Prices are snapshots taken at
/// order time; later catalog or VAT changes never touch a persisted line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    /// Net unit price at order time.
    pub unit_price: Decimal,
    pub region: String,
    pub vat_percentage: Decimal,
    /// Per-unit VAT, derived from the rounded gross unit price so that
    /// `unit_price + vat_amount` is exact.
    pub vat_amount: Decimal,
    /// `(unit_price + vat_amount) * quantity`.
    pub final_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    pub fn new(
        order_id: Uuid,
        product: &Product,
        quantity: i32,
        region: impl Into<String>,
        vat_percentage: Decimal,
        quote: &PriceQuote,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
            region: region.into(),
            vat_percentage,
            vat_amount: quote.vat_amount,
            final_price: quote.final_price * Decimal::from(quantity),
            created_at: Utc::now(),
        }
    }
}

/// One requested position before pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A single order submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub contact_name: Option<String>,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
}

impl OrderRequest {
    pub fn of_items(items: Vec<OrderLineRequest>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }
}

/// Outcome of one sub-order inside a bulk submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOrderResult {
    pub order_index: usize,
    pub success: bool,
    pub message: String,
    /// Stable error code when the sub-order failed.
    pub error: Option<String>,
    pub order: Option<Order>,
}

/// Aggregate over a bulk submission, results in submission order. A failed
/// sub-order never aborts its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkOrderOutcome {
    pub total_orders: usize,
    pub successful_orders: usize,
    pub failed_orders: usize,
    pub results: Vec<BulkOrderResult>,
}

impl BulkOrderOutcome {
    pub fn successes(&self) -> impl Iterator<Item = &Order> {
        self.results.iter().filter_map(|r| r.order.as_ref())
    }
}

/// Everything that can go wrong while placing an order. All variants are
/// recoverable at the request boundary; any durable side effects of the
/// failing order have been rolled back by the time one of these surfaces.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: Uuid },

    #[error("Product {product_name} is not available in region {region}")]
    RegionMismatch {
        product_name: String,
        region: String,
    },

    #[error("Insufficient stock for product {product_id}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product_id: Uuid,
        available: i32,
        requested: i32,
    },

    #[error("Pricing configuration not found for region: {region}")]
    PricingConfigMissing { region: String },

    #[error("Invalid pricing input: {0}")]
    InvalidPricingInput(String),

    #[error("Order confirmation failed: {0}")]
    ConfirmationFailed(String),

    #[error("Invalid order payload: {0}")]
    InvalidOrderShape(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl OrderError {
    /// Stable code surfaced in bulk results and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::ProductNotFound { .. } => "PRODUCT_NOT_FOUND",
            OrderError::RegionMismatch { .. } => "PRODUCT_REGION_MISMATCH",
            OrderError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            OrderError::PricingConfigMissing { .. } => "REGION_PRICING_CONFIG_NOT_FOUND",
            OrderError::InvalidPricingInput(_) => "INVALID_PRICING_INPUT",
            OrderError::ConfirmationFailed(_) => "CONFIRMATION_FAILED",
            OrderError::InvalidOrderShape(_) => "INVALID_ORDER_SHAPE",
            OrderError::Storage(_) => "STORAGE_FAILURE",
        }
    }
}

impl From<InventoryError> for OrderError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::ProductNotFound { product_id } => {
                OrderError::ProductNotFound { product_id }
            }
            InventoryError::InsufficientStock {
                product_id,
                available,
                requested,
            } => OrderError::InsufficientStock {
                product_id,
                available,
                requested,
            },
            InventoryError::Store(msg) => OrderError::Storage(msg),
        }
    }
}

impl From<PricingError> for OrderError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidInput(msg) => OrderError::InvalidPricingInput(msg),
        }
    }
}
