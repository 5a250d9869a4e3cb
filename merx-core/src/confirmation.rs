use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire request sent to the external confirmation authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub order_id: Uuid,
    pub total_price: Decimal,
}

/// Envelope the authority answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationEnvelope {
    pub success: bool,
    pub data: Option<ConfirmationData>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationData {
    pub confirmation_number: Option<String>,
}

/// Obtains a confirmation number for an order total from the external
/// confirmation authority. Any non-success answer, including a blank
/// confirmation number, is a hard failure and the caller must roll the
/// order back.
#[async_trait]
pub trait ConfirmationGateway: Send + Sync {
    async fn confirm(
        &self,
        order_id: Uuid,
        total_price: Decimal,
    ) -> Result<String, ConfirmationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfirmationError {
    #[error("confirmation request failed: {0}")]
    Transport(String),

    #[error("confirmation authority rejected order {order_id}: {reason}")]
    Rejected { order_id: Uuid, reason: String },

    #[error("confirmation authority returned an empty confirmation number for order {order_id}")]
    EmptyConfirmationNumber { order_id: Uuid },
}
