use merx_catalog::region::RegionCurrencyMap;
use merx_catalog::repository::{ProductCatalog, RegionPricingLookup};
use merx_core::cache::CacheCoordinator;
use merx_order::repository::OrderRepository;
use merx_order::OrderOrchestrator;
use merx_store::EventProducer;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<OrderOrchestrator>,
    pub orders: Arc<dyn OrderRepository>,
    pub products: Arc<dyn ProductCatalog>,
    pub region_pricing: Arc<dyn RegionPricingLookup>,
    pub cache: Arc<dyn CacheCoordinator>,
    pub events: Arc<EventProducer>,
    pub currencies: Arc<RegionCurrencyMap>,
}
