use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Cached read views that price and product data flow into. Price results
/// derive from several entities at once, so invalidation is coarse: a whole
/// region is dropped rather than trying to enumerate affected keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheRegion {
    Products,
    ProductDetails,
    ProductPrice,
    PricingConfig,
}

impl CacheRegion {
    /// Regions invalidated by any product or stock mutation.
    pub const PRODUCT_VIEWS: [CacheRegion; 3] = [
        CacheRegion::Products,
        CacheRegion::ProductDetails,
        CacheRegion::ProductPrice,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CacheRegion::Products => "products",
            CacheRegion::ProductDetails => "product_details",
            CacheRegion::ProductPrice => "product_price",
            CacheRegion::PricingConfig => "pricing_config",
        }
    }
}

/// Single consumer for cache invalidation across the system.
///
/// Every operation that mutates product, stock, or region pricing data,
/// inside this engine or in the surrounding CRUD services, must report the
/// affected regions here. `invalidate` is idempotent; calling it twice for
/// the same regions leaves the cache in the same state as calling it once.
#[async_trait]
pub trait CacheCoordinator: Send + Sync {
    async fn invalidate(
        &self,
        regions: &[CacheRegion],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        region: CacheRegion,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    async fn put(
        &self,
        region: CacheRegion,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// In-process coordinator backed by a plain map per region.
#[derive(Default)]
pub struct MemoryCacheCoordinator {
    regions: RwLock<HashMap<CacheRegion, HashMap<String, String>>>,
}

impl MemoryCacheCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries in a region, for diagnostics.
    pub fn entry_count(&self, region: CacheRegion) -> usize {
        self.regions
            .read()
            .expect("cache lock poisoned")
            .get(&region)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl CacheCoordinator for MemoryCacheCoordinator {
    async fn invalidate(
        &self,
        regions: &[CacheRegion],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut guard = self.regions.write().expect("cache lock poisoned");
        for region in regions {
            guard.remove(region);
        }
        Ok(())
    }

    async fn get(
        &self,
        region: CacheRegion,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let guard = self.regions.read().expect("cache lock poisoned");
        Ok(guard.get(&region).and_then(|entries| entries.get(key).cloned()))
    }

    async fn put(
        &self,
        region: CacheRegion,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut guard = self.regions.write().expect("cache lock poisoned");
        guard
            .entry(region)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
