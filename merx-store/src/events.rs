use merx_shared::models::events::{OrderConfirmedEvent, StockAdjustedEvent};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{error, info};

const TOPIC_ORDERS_CONFIRMED: &str = "merx.orders.confirmed";
const TOPIC_STOCK_ADJUSTED: &str = "merx.inventory.adjusted";

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    pub async fn publish_order_confirmed(
        &self,
        event: &OrderConfirmedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let payload = serde_json::to_string(event)?;
        self.publish(TOPIC_ORDERS_CONFIRMED, &event.order_id.to_string(), &payload)
            .await?;
        Ok(())
    }

    pub async fn publish_stock_adjusted(
        &self,
        event: &StockAdjustedEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let payload = serde_json::to_string(event)?;
        self.publish(TOPIC_STOCK_ADJUSTED, &event.product_id.to_string(), &payload)
            .await?;
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<(), rdkafka::error::KafkaError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                info!(
                    "Published event to {}/{}: partition {} offset {}",
                    topic, key, delivery.partition, delivery.offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to publish event to {}: {}", topic, e);
                Err(e)
            }
        }
    }
}
