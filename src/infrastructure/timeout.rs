use crate::domain::filter::FilterCriteria;
use crate::domain::payment::{NewPayment, PaymentStatus, WirePaymentRecord};
use crate::domain::ports::PaymentGateway;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::error;

/// Bounds every call of the wrapped gateway by a fixed timeout.
///
/// An elapsed call is reported as [`PaymentError::Transport`], the same kind
/// as any other network failure.
pub struct TimeoutGateway<G> {
    inner: G,
    timeout: Duration,
}

impl<G: PaymentGateway> TimeoutGateway<G> {
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                error!(operation, timeout_ms = self.timeout.as_millis() as u64, "request timed out");
                Err(PaymentError::Transport(format!(
                    "{operation} timed out after {} ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl<G: PaymentGateway> PaymentGateway for TimeoutGateway<G> {
    async fn fetch_payments(&self, criteria: &FilterCriteria) -> Result<Vec<WirePaymentRecord>> {
        self.bounded("fetch payments", self.inner.fetch_payments(criteria))
            .await
    }

    async fn create_payment(&self, payment: &NewPayment) -> Result<WirePaymentRecord> {
        self.bounded("create payment", self.inner.create_payment(payment))
            .await
    }

    async fn set_status(&self, payment_id: u64, new_status: PaymentStatus) -> Result<String> {
        self.bounded("set status", self.inner.set_status(payment_id, new_status))
            .await
    }

    async fn deactivate(&self, id: &str) -> Result<String> {
        self.bounded("deactivate", self.inner.deactivate(id)).await
    }
}
