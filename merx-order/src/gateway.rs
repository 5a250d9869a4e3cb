use async_trait::async_trait;
use merx_core::confirmation::{ConfirmationError, ConfirmationGateway};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Stand-in confirmation authority for tests and local runs. Hands out
/// `CNF-{timestamp}-{id}` numbers, or rejects everything while the failing
/// switch is on.
#[derive(Default)]
pub struct MockConfirmationGateway {
    failing: AtomicBool,
}

impl MockConfirmationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConfirmationGateway for MockConfirmationGateway {
    async fn confirm(
        &self,
        order_id: Uuid,
        _total_price: Decimal,
    ) -> Result<String, ConfirmationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConfirmationError::Rejected {
                order_id,
                reason: "simulated confirmation outage".to_string(),
            });
        }

        let timestamp = chrono::Utc::now().timestamp();
        let short_id = &order_id.simple().to_string()[..8];
        Ok(format!("CNF-{}-{}", timestamp, short_id.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn issues_a_prefixed_confirmation_number() {
        let gateway = MockConfirmationGateway::new();
        let number = gateway.confirm(Uuid::new_v4(), dec!(216.50)).await.unwrap();
        assert!(number.starts_with("CNF-"));
    }

    #[tokio::test]
    async fn failing_mode_rejects_every_order() {
        let gateway = MockConfirmationGateway::failing();
        let err = gateway.confirm(Uuid::new_v4(), dec!(10.00)).await.unwrap_err();
        assert!(matches!(err, ConfirmationError::Rejected { .. }));

        gateway.set_failing(false);
        assert!(gateway.confirm(Uuid::new_v4(), dec!(10.00)).await.is_ok());
    }
}
