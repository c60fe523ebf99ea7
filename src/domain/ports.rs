use super::filter::FilterCriteria;
use super::payment::{NewPayment, PaymentStatus, WirePaymentRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The remote payment service as seen by the list controller.
///
/// Implementations report timeouts, network and server failures as
/// [`PaymentError::Transport`](crate::error::PaymentError::Transport);
/// rejected mutations as `BusinessRule`, missing targets as `NotFound`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn fetch_payments(&self, criteria: &FilterCriteria) -> Result<Vec<WirePaymentRecord>>;
    async fn create_payment(&self, payment: &NewPayment) -> Result<WirePaymentRecord>;
    /// Requests a status change, returning the service's confirmation text.
    async fn set_status(&self, payment_id: u64, new_status: PaymentStatus) -> Result<String>;
    /// Soft-deletes the record with the given opaque id.
    async fn deactivate(&self, id: &str) -> Result<String>;
}

pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
