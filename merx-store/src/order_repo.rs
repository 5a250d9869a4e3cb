use async_trait::async_trait;
use merx_order::models::{Order, OrderLine, OrderStatus};
use merx_order::repository::OrderRepository;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn order_from_row(row: &sqlx::postgres::PgRow, lines: Vec<OrderLine>) -> Result<Order, Box<dyn std::error::Error + Send + Sync>> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            region: row.try_get("region")?,
            status: status.parse::<OrderStatus>()?,
            total_price: row.try_get("total_price")?,
            confirmation_number: row.try_get("confirmation_number")?,
            contact_name: row.try_get("contact_name")?,
            phone_number: row.try_get("phone_number")?,
            delivery_address: row.try_get("delivery_address")?,
            lines,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn lines_for(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderLine>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT id, order_id, product_id, product_name, quantity, unit_price, region, \
                    vat_percentage, vat_amount, final_price, created_at \
             FROM order_items WHERE order_id = $1 ORDER BY created_at",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            lines.push(OrderLine {
                id: row.try_get("id")?,
                order_id: row.try_get("order_id")?,
                product_id: row.try_get("product_id")?,
                product_name: row.try_get("product_name")?,
                quantity: row.try_get("quantity")?,
                unit_price: row.try_get("unit_price")?,
                region: row.try_get("region")?,
                vat_percentage: row.try_get("vat_percentage")?,
                vat_amount: row.try_get("vat_amount")?,
                final_price: row.try_get("final_price")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(lines)
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, customer_id, region, status, total_price, confirmation_number, \
                                 contact_name, phone_number, delivery_address, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(order.id)
        .bind(&order.customer_id)
        .bind(&order.region)
        .bind(order.status.as_str())
        .bind(order.total_price)
        .bind(&order.confirmation_number)
        .bind(&order.contact_name)
        .bind(&order.phone_number)
        .bind(&order.delivery_address)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for line in &order.lines {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, product_name, quantity, unit_price, \
                                          region, vat_percentage, vat_amount, final_price, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(line.id)
            .bind(line.order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(&line.region)
            .bind(line.vat_percentage)
            .bind(line.vat_amount)
            .bind(line.final_price)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query(
            "SELECT id, customer_id, region, status, total_price, confirmation_number, \
                    contact_name, phone_number, delivery_address, created_at, updated_at \
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = self.lines_for(id).await?;
        Ok(Some(Self::order_from_row(&row, lines)?))
    }

    async fn update_confirmation(
        &self,
        id: Uuid,
        status: OrderStatus,
        confirmation_number: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "UPDATE orders SET status = $2, confirmation_number = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(confirmation_number)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_order(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // order_items rows go with the order via ON DELETE CASCADE.
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_orders(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT id FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.try_get("id")?;
            if let Some(order) = self.get_order(id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn list_orders_by_region(
        &self,
        region: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query(
            "SELECT id FROM orders WHERE UPPER(region) = UPPER($1) ORDER BY created_at DESC",
        )
        .bind(region)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.try_get("id")?;
            if let Some(order) = self.get_order(id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }
}
