use crate::models::{Order, OrderStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Durable order storage. `delete_order` exists for the rollback path: a
/// failed order must leave no record behind.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_confirmation(
        &self,
        id: Uuid,
        status: OrderStatus,
        confirmation_number: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn delete_order(&self, id: Uuid)
        -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_orders_by_region(
        &self,
        region: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Order storage held in process, for tests and local runs.
#[derive(Default)]
pub struct MemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_count(&self) -> usize {
        self.orders.read().expect("order lock poisoned").len()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn create_order(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.write().expect("order lock poisoned");
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().expect("order lock poisoned");
        Ok(orders.get(&id).cloned())
    }

    async fn update_confirmation(
        &self,
        id: Uuid,
        status: OrderStatus,
        confirmation_number: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.write().expect("order lock poisoned");
        let order = orders
            .get_mut(&id)
            .ok_or_else(|| format!("order not found: {id}"))?;
        order.status = status;
        order.confirmation_number = Some(confirmation_number.to_string());
        order.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn delete_order(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.write().expect("order lock poisoned");
        orders.remove(&id);
        Ok(())
    }

    async fn list_orders(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().expect("order lock poisoned");
        let mut matches: Vec<Order> = orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    async fn list_orders_by_region(
        &self,
        region: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let orders = self.orders.read().expect("order lock poisoned");
        let mut matches: Vec<Order> = orders
            .values()
            .filter(|o| o.region.eq_ignore_ascii_case(region))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }
}
