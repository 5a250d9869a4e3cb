use crate::product::Product;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Read access to the product catalog. Catalog writes happen in the
/// surrounding CRUD services, not here.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Resolves the VAT percentage configured for a region. Region keys are
/// case-insensitive.
#[async_trait]
pub trait RegionPricingLookup: Send + Sync {
    async fn vat_rate(
        &self,
        region: &str,
    ) -> Result<Option<Decimal>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Catalog held in process, for tests and local runs.
#[derive(Default)]
pub struct MemoryProductCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        let mut products = self.products.write().expect("catalog lock poisoned");
        products.insert(product.id, product);
    }
}

#[async_trait]
impl ProductCatalog for MemoryProductCatalog {
    async fn get_product(
        &self,
        id: Uuid,
    ) -> Result<Option<Product>, Box<dyn std::error::Error + Send + Sync>> {
        let products = self.products.read().expect("catalog lock poisoned");
        Ok(products.get(&id).cloned())
    }
}

/// Region VAT table held in process.
#[derive(Default)]
pub struct MemoryRegionPricing {
    rates: RwLock<HashMap<String, Decimal>>,
}

impl MemoryRegionPricing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rate(&self, region: &str, vat_percentage: Decimal) {
        let mut rates = self.rates.write().expect("pricing lock poisoned");
        rates.insert(region.to_uppercase(), vat_percentage);
    }
}

#[async_trait]
impl RegionPricingLookup for MemoryRegionPricing {
    async fn vat_rate(
        &self,
        region: &str,
    ) -> Result<Option<Decimal>, Box<dyn std::error::Error + Send + Sync>> {
        let rates = self.rates.read().expect("pricing lock poisoned");
        Ok(rates.get(&region.to_uppercase()).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn region_lookup_is_case_insensitive() {
        let pricing = MemoryRegionPricing::new();
        pricing.set_rate("us", dec!(8.25));

        assert_eq!(pricing.vat_rate("US").await.unwrap(), Some(dec!(8.25)));
        assert_eq!(pricing.vat_rate("uS").await.unwrap(), Some(dec!(8.25)));
        assert_eq!(pricing.vat_rate("EU").await.unwrap(), None);
    }
}
