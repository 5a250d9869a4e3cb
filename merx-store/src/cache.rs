use async_trait::async_trait;
use merx_core::cache::{CacheCoordinator, CacheRegion};
use redis::AsyncCommands;
use tracing::info;

/// Cache coordinator over Redis. Each cache region lives in its own hash
/// under `cache:{region}`; coarse invalidation deletes the whole hash, which
/// is naturally idempotent since deleting an absent key is a no-op.
#[derive(Clone)]
pub struct RedisCacheCoordinator {
    client: redis::Client,
}

impl RedisCacheCoordinator {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    fn region_key(region: CacheRegion) -> String {
        format!("cache:{}", region.key())
    }
}

#[async_trait]
impl CacheCoordinator for RedisCacheCoordinator {
    async fn invalidate(
        &self,
        regions: &[CacheRegion],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        for region in regions {
            let _: () = conn.del(Self::region_key(*region)).await?;
            info!("Cache region {} invalidated", region.key());
        }
        Ok(())
    }

    async fn get(
        &self,
        region: CacheRegion,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.hget(Self::region_key(region), key).await?;
        Ok(value)
    }

    async fn put(
        &self,
        region: CacheRegion,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.hset(Self::region_key(region), key, value).await?;
        Ok(())
    }
}
