use crate::models::{
    BulkOrderOutcome, BulkOrderResult, Order, OrderError, OrderLine, OrderRequest, OrderStatus,
};
use crate::repository::OrderRepository;
use merx_catalog::pricing;
use merx_catalog::repository::{ProductCatalog, RegionPricingLookup};
use merx_catalog::Product;
use merx_core::cache::{CacheCoordinator, CacheRegion};
use merx_core::confirmation::ConfirmationGateway;
use merx_core::inventory::InventoryLedger;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Error code reported when the bulk fast path rejects a sub-order before it
/// reaches the pipeline.
pub const STOCK_UNAVAILABLE: &str = "STOCK_UNAVAILABLE";

/// Drives an order from submitted line items to a confirmed, stock-deducted,
/// cache-invalidated record, or rolls every durable effect back.
///
/// The orchestrator takes no locks of its own. Any number of tasks may place
/// orders concurrently; contention on a product is resolved solely by the
/// ledger's atomic conditional decrement.
pub struct OrderOrchestrator {
    products: Arc<dyn ProductCatalog>,
    inventory: Arc<dyn InventoryLedger>,
    region_pricing: Arc<dyn RegionPricingLookup>,
    orders: Arc<dyn OrderRepository>,
    confirmations: Arc<dyn ConfirmationGateway>,
    cache: Arc<dyn CacheCoordinator>,
}

impl OrderOrchestrator {
    pub fn new(
        products: Arc<dyn ProductCatalog>,
        inventory: Arc<dyn InventoryLedger>,
        region_pricing: Arc<dyn RegionPricingLookup>,
        orders: Arc<dyn OrderRepository>,
        confirmations: Arc<dyn ConfirmationGateway>,
        cache: Arc<dyn CacheCoordinator>,
    ) -> Self {
        Self {
            products,
            inventory,
            region_pricing,
            orders,
            confirmations,
            cache,
        }
    }

    /// Place a single order.
    ///
    /// Validate every line, price it against the region's VAT rate, persist
    /// the order, reserve stock line by line, then obtain the external
    /// confirmation number. The first failure after persistence releases all
    /// reservations made so far and deletes the order record; the caller sees
    /// either a confirmed order or untouched durable state.
    pub async fn place_order(
        &self,
        request: OrderRequest,
        customer_id: &str,
        region: &str,
    ) -> Result<Order, OrderError> {
        info!(
            "Creating order with {} items for customer {} in region {}",
            request.items.len(),
            customer_id,
            region
        );

        if request.items.is_empty() {
            return Err(OrderError::InvalidOrderShape(
                "order must contain at least one line item".to_string(),
            ));
        }
        if let Some(bad) = request.items.iter().find(|item| item.quantity < 1) {
            return Err(OrderError::InvalidOrderShape(format!(
                "quantity must be at least 1 for product {}",
                bad.product_id
            )));
        }

        // Resolve products and enforce region consistency before touching
        // anything durable.
        let mut resolved: Vec<(Product, i32)> = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product = self
                .products
                .get_product(item.product_id)
                .await
                .map_err(|e| OrderError::Storage(e.to_string()))?
                .ok_or(OrderError::ProductNotFound {
                    product_id: item.product_id,
                })?;

            if !product.sold_in(region) {
                return Err(OrderError::RegionMismatch {
                    product_name: product.name,
                    region: region.to_string(),
                });
            }
            resolved.push((product, item.quantity));
        }

        // The order's region decides the VAT rate; line regions were just
        // checked to match it.
        let vat_percentage = self
            .region_pricing
            .vat_rate(region)
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or_else(|| OrderError::PricingConfigMissing {
                region: region.to_string(),
            })?;

        let mut order = Order::new(customer_id, region);
        order.contact_name = request.contact_name;
        order.phone_number = request.phone_number;
        order.delivery_address = request.delivery_address;

        for (product, quantity) in &resolved {
            let quote = pricing::price_with_vat(product.price, vat_percentage)?;
            let line = OrderLine::new(order.id, product, *quantity, region, vat_percentage, &quote);
            order.add_line(line);
        }

        // Persist before reserving so the reservation and confirmation steps
        // work against a durable identifier.
        self.orders
            .create_order(&order)
            .await
            .map_err(|e| OrderError::Storage(e.to_string()))?;

        let mut reserved: Vec<(Uuid, i32)> = Vec::with_capacity(resolved.len());
        for (product, quantity) in &resolved {
            match self.inventory.reserve(product.id, *quantity).await {
                Ok(()) => reserved.push((product.id, *quantity)),
                Err(err) => {
                    warn!(
                        "Reservation failed for product {} on order {}: {}",
                        product.id, order.id, err
                    );
                    self.roll_back(&order, &reserved).await;
                    return Err(err.into());
                }
            }
        }

        let confirmation_number = match self
            .confirmations
            .confirm(order.id, order.total_price)
            .await
        {
            Ok(number) if number.trim().is_empty() => {
                self.roll_back(&order, &reserved).await;
                return Err(OrderError::ConfirmationFailed(format!(
                    "empty confirmation number for order {}",
                    order.id
                )));
            }
            Ok(number) => number,
            Err(err) => {
                warn!("Confirmation failed for order {}: {}", order.id, err);
                self.roll_back(&order, &reserved).await;
                return Err(OrderError::ConfirmationFailed(err.to_string()));
            }
        };

        order.confirm(confirmation_number.clone());
        if let Err(err) = self
            .orders
            .update_confirmation(order.id, OrderStatus::Confirmed, &confirmation_number)
            .await
        {
            self.roll_back(&order, &reserved).await;
            return Err(OrderError::Storage(err.to_string()));
        }

        self.invalidate_product_views().await;
        info!(
            "Order {} confirmed with confirmation number {}",
            order.id, confirmation_number
        );

        Ok(order)
    }

    /// Place a batch of independent sub-orders for one customer and region.
    ///
    /// Sub-orders run sequentially, each in its own transaction; one failing
    /// does not abort the others. An aggregate availability pass over all
    /// requested quantities rejects obviously unfillable sub-orders up front,
    /// but the reservation inside the pipeline remains the only authority.
    pub async fn place_orders(
        &self,
        sub_orders: Vec<OrderRequest>,
        customer_id: &str,
        region: &str,
    ) -> BulkOrderOutcome {
        info!(
            "Creating {} bulk orders for customer {} in region {}",
            sub_orders.len(),
            customer_id,
            region
        );

        let mut requested: HashMap<Uuid, i32> = HashMap::new();
        for sub in &sub_orders {
            for item in &sub.items {
                *requested.entry(item.product_id).or_insert(0) += item.quantity;
            }
        }

        let mut availability: HashMap<Uuid, bool> = HashMap::new();
        for (product_id, quantity) in &requested {
            let available = match self.inventory.check_available(*product_id, *quantity).await {
                Ok(available) => available,
                Err(err) => {
                    warn!(
                        "Availability pre-check failed for product {}: {}",
                        product_id, err
                    );
                    false
                }
            };
            availability.insert(*product_id, available);
        }

        let total_orders = sub_orders.len();
        let mut successful_orders = 0;
        let mut failed_orders = 0;
        let mut results = Vec::with_capacity(total_orders);

        for (order_index, sub) in sub_orders.into_iter().enumerate() {
            let flagged = sub
                .items
                .iter()
                .any(|item| !availability.get(&item.product_id).copied().unwrap_or(false));

            let result = if flagged {
                failed_orders += 1;
                BulkOrderResult {
                    order_index,
                    success: false,
                    message: "Insufficient stock for one or more products in this order"
                        .to_string(),
                    error: Some(STOCK_UNAVAILABLE.to_string()),
                    order: None,
                }
            } else {
                match self.place_order(sub, customer_id, region).await {
                    Ok(order) => {
                        successful_orders += 1;
                        BulkOrderResult {
                            order_index,
                            success: true,
                            message: "Order processed successfully".to_string(),
                            error: None,
                            order: Some(order),
                        }
                    }
                    Err(err) => {
                        error!("Error processing sub-order {}: {}", order_index, err);
                        failed_orders += 1;
                        BulkOrderResult {
                            order_index,
                            success: false,
                            message: err.to_string(),
                            error: Some(err.kind().to_string()),
                            order: None,
                        }
                    }
                }
            };
            results.push(result);
        }

        BulkOrderOutcome {
            total_orders,
            successful_orders,
            failed_orders,
            results,
        }
    }

    /// Undo a partially executed order: return reserved stock, drop the
    /// persisted record, and, if any reservation had committed, invalidate
    /// product views, since stock counters moved even though the order
    /// ultimately failed.
    async fn roll_back(&self, order: &Order, reserved: &[(Uuid, i32)]) {
        for (product_id, quantity) in reserved {
            if let Err(err) = self.inventory.release(*product_id, *quantity).await {
                error!(
                    "Failed to release {} units of product {} while rolling back order {}: {}",
                    quantity, product_id, order.id, err
                );
            }
        }

        if let Err(err) = self.orders.delete_order(order.id).await {
            error!(
                "Failed to discard order {} during rollback: {}",
                order.id, err
            );
        }

        if !reserved.is_empty() {
            self.invalidate_product_views().await;
        }
    }

    async fn invalidate_product_views(&self) {
        if let Err(err) = self.cache.invalidate(&CacheRegion::PRODUCT_VIEWS).await {
            // A stale entry would be served until the next invalidation;
            // the order itself is already durable.
            error!("Cache invalidation failed: {}", err);
        }
    }
}
