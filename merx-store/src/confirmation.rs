use crate::app_config::ConfirmationConfig;
use async_trait::async_trait;
use merx_core::confirmation::{
    ConfirmationEnvelope, ConfirmationError, ConfirmationGateway, ConfirmationRequest,
};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

/// Confirmation authority reached over HTTP. The client timeout bounds the
/// whole round trip; once it fires the order is rolled back, so a slow
/// authority can never leave stock half-deducted.
pub struct HttpConfirmationGateway {
    client: reqwest::Client,
    confirm_url: String,
}

impl HttpConfirmationGateway {
    pub fn new(config: &ConfirmationConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            confirm_url: format!("{}/api/confirmations", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ConfirmationGateway for HttpConfirmationGateway {
    async fn confirm(
        &self,
        order_id: Uuid,
        total_price: Decimal,
    ) -> Result<String, ConfirmationError> {
        info!(
            "Confirming order {} for total price {}",
            order_id, total_price
        );

        let request = ConfirmationRequest {
            order_id,
            total_price,
        };

        let response = self
            .client
            .post(&self.confirm_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ConfirmationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ConfirmationError::Rejected {
                order_id,
                reason: format!("HTTP status {}", response.status()),
            });
        }

        let envelope: ConfirmationEnvelope = response
            .json()
            .await
            .map_err(|e| ConfirmationError::Transport(e.to_string()))?;

        if !envelope.success {
            let reason = envelope
                .message
                .unwrap_or_else(|| "authority reported failure".to_string());
            error!("Confirmation rejected for order {}: {}", order_id, reason);
            return Err(ConfirmationError::Rejected { order_id, reason });
        }

        match envelope
            .data
            .and_then(|data| data.confirmation_number)
            .filter(|number| !number.trim().is_empty())
        {
            Some(number) => {
                info!("Confirmation successful for order {}: {}", order_id, number);
                Ok(number)
            }
            None => Err(ConfirmationError::EmptyConfirmationNumber { order_id }),
        }
    }
}
