use async_trait::async_trait;
use uuid::Uuid;

/// Per-product stock ledger.
///
/// `reserve` is the only authoritative mutation in the order pipeline. It
/// must be a single conditional decrement, "subtract `quantity` only if the
/// current stock covers it", executed atomically against the backing store,
/// never a read followed by a separate write. Concurrent orders on the same
/// product are serialized at exactly this point and nowhere else.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Non-authoritative availability read. Used for fast-path rejection of
    /// bulk batches; never the sole gate before a mutation.
    async fn check_available(&self, product_id: Uuid, quantity: i32) -> Result<bool, InventoryError>;

    /// Atomically decrement stock by `quantity` if at least that much is
    /// available. Fails with `InsufficientStock` otherwise; stock can never
    /// go negative.
    async fn reserve(&self, product_id: Uuid, quantity: i32) -> Result<(), InventoryError>;

    /// Return previously reserved stock. Compensating action for rolled-back
    /// orders.
    async fn release(&self, product_id: Uuid, quantity: i32) -> Result<(), InventoryError>;

    /// Current stock level.
    async fn stock_level(&self, product_id: Uuid) -> Result<i32, InventoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: Uuid },

    #[error("Insufficient stock for product {product_id}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product_id: Uuid,
        available: i32,
        requested: i32,
    },

    #[error("Inventory store failure: {0}")]
    Store(String),
}
