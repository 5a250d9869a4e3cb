use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry as the order pipeline sees it. Stock is the only field this
/// engine ever mutates, and only through the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Net price, excluding VAT, 2 decimal places.
    pub price: Decimal,
    /// ISO 4217 code, matching the product's region.
    pub currency: String,
    pub stock_qty: i32,
    pub category: String,
    pub region: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        price: Decimal,
        currency: impl Into<String>,
        stock_qty: i32,
        category: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            price,
            currency: currency.into(),
            stock_qty,
            category: category.into(),
            region: region.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this product may appear on an order placed in `region`.
    pub fn sold_in(&self, region: &str) -> bool {
        self.region.eq_ignore_ascii_case(region)
    }
}
