//! Payment gateway seam. The checkout flow only needs two calls: create a
//! gateway order for an amount, and confirm a payment reference against it.
//! The real gateway client plugs in behind [`PaymentGateway`]; the sandbox
//! implementation mints references locally and verifies confirmations
//! against the amounts it issued.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway order creation failed: {0}")]
    Initiation(String),

    #[error("payment not confirmed: {0}")]
    Confirmation(String),
}

#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub amount: i64,
    pub payment_reference: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, amount: i64, currency: &str)
    -> Result<GatewayOrder, GatewayError>;

    async fn confirm_payment(
        &self,
        gateway_order_id: &str,
        payment_reference: &str,
    ) -> Result<PaymentConfirmation, GatewayError>;
}

/// In-process gateway for development and tests. Remembers the amount of
/// every order it created and confirms any non-empty payment reference
/// against it.
#[derive(Default)]
pub struct SandboxGateway {
    orders: Mutex<HashMap<String, i64>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        if amount <= 0 {
            return Err(GatewayError::Initiation(
                "amount must be positive".to_string(),
            ));
        }

        let id = format!("order_{}", Uuid::new_v4().simple());
        self.orders
            .lock()
            .map_err(|_| GatewayError::Initiation("gateway state poisoned".to_string()))?
            .insert(id.clone(), amount);

        Ok(GatewayOrder {
            id,
            amount,
            currency: currency.to_string(),
        })
    }

    async fn confirm_payment(
        &self,
        gateway_order_id: &str,
        payment_reference: &str,
    ) -> Result<PaymentConfirmation, GatewayError> {
        if payment_reference.trim().is_empty() {
            return Err(GatewayError::Confirmation(
                "missing payment reference".to_string(),
            ));
        }

        let orders = self
            .orders
            .lock()
            .map_err(|_| GatewayError::Confirmation("gateway state poisoned".to_string()))?;
        let amount = orders
            .get(gateway_order_id)
            .copied()
            .ok_or_else(|| GatewayError::Confirmation("unknown gateway order".to_string()))?;

        Ok(PaymentConfirmation {
            amount,
            payment_reference: payment_reference.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sandbox_confirms_what_it_created() {
        let gateway = SandboxGateway::new();
        let order = gateway.create_order(540, "INR").await.unwrap();
        assert_eq!(order.amount, 540);

        let confirmation = gateway.confirm_payment(&order.id, "pay_test_1").await.unwrap();
        assert_eq!(confirmation.amount, 540);
    }

    #[tokio::test]
    async fn sandbox_rejects_unknown_orders_and_empty_references() {
        let gateway = SandboxGateway::new();
        assert!(gateway.confirm_payment("order_missing", "pay_1").await.is_err());

        let order = gateway.create_order(100, "INR").await.unwrap();
        assert!(gateway.confirm_payment(&order.id, " ").await.is_err());
    }

    #[tokio::test]
    async fn sandbox_rejects_non_positive_amounts() {
        let gateway = SandboxGateway::new();
        assert!(gateway.create_order(0, "INR").await.is_err());
    }
}
