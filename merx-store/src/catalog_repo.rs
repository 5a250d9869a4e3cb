use async_trait::async_trait;
use merx_catalog::repository::{ProductCatalog, RegionPricingLookup};
use merx_catalog::Product;
use merx_core::inventory::{InventoryError, InventoryLedger};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT id, name, description, price, currency, stock_qty, category, region, created_at, updated_at \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Product {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            currency: row.try_get("currency")?,
            stock_qty: row.try_get("stock_qty")?,
            category: row.try_get("category")?,
            region: row.try_get("region")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

pub struct PgRegionPricing {
    pool: PgPool,
}

impl PgRegionPricing {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegionPricingLookup for PgRegionPricing {
    async fn vat_rate(
        &self,
        region: &str,
    ) -> Result<Option<Decimal>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT vat_percentage FROM region_pricing_config WHERE UPPER(region) = UPPER($1)",
        )
        .bind(region)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => Some(row.try_get("vat_percentage")?),
            None => None,
        })
    }
}

/// Stock ledger over the products table.
///
/// `reserve` is one guarded UPDATE: the decrement only applies where the
/// row still covers the requested quantity, so concurrent orders on the same
/// product serialize inside the database and stock cannot go negative.
pub struct PgInventoryLedger {
    pool: PgPool,
}

impl PgInventoryLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_stock(&self, product_id: Uuid) -> Result<Option<i32>, InventoryError> {
        let row = sqlx::query("SELECT stock_qty FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| InventoryError::Store(e.to_string()))?;

        match row {
            Some(row) => row
                .try_get("stock_qty")
                .map(Some)
                .map_err(|e| InventoryError::Store(e.to_string())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl InventoryLedger for PgInventoryLedger {
    async fn check_available(&self, product_id: Uuid, quantity: i32) -> Result<bool, InventoryError> {
        match self.current_stock(product_id).await? {
            Some(available) => Ok(available >= quantity),
            None => Err(InventoryError::ProductNotFound { product_id }),
        }
    }

    async fn reserve(&self, product_id: Uuid, quantity: i32) -> Result<(), InventoryError> {
        let result = sqlx::query(
            "UPDATE products SET stock_qty = stock_qty - $2, updated_at = NOW() \
             WHERE id = $1 AND stock_qty >= $2",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| InventoryError::Store(e.to_string()))?;

        if result.rows_affected() == 1 {
            info!("Reserved {} units of product {}", quantity, product_id);
            return Ok(());
        }

        // The guard refused: either the product is gone or the stock does
        // not cover the request.
        match self.current_stock(product_id).await? {
            Some(available) => Err(InventoryError::InsufficientStock {
                product_id,
                available,
                requested: quantity,
            }),
            None => Err(InventoryError::ProductNotFound { product_id }),
        }
    }

    async fn release(&self, product_id: Uuid, quantity: i32) -> Result<(), InventoryError> {
        let result = sqlx::query(
            "UPDATE products SET stock_qty = stock_qty + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| InventoryError::Store(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::ProductNotFound { product_id });
        }
        info!("Released {} units of product {}", quantity, product_id);
        Ok(())
    }

    async fn stock_level(&self, product_id: Uuid) -> Result<i32, InventoryError> {
        self.current_stock(product_id)
            .await?
            .ok_or(InventoryError::ProductNotFound { product_id })
    }
}
