use crate::domain::filter::FilterCriteria;
use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus, WirePaymentRecord};
use crate::domain::ports::PaymentGateway;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A thread-safe in-process payment service.
///
/// Keeps records in insertion order behind `Arc<RwLock<Vec<_>>>` and applies
/// the same rules as the remote service: only active records are listed,
/// successful payments are final, and only pending payments can be
/// deactivated. Used by the CLI and in tests.
#[derive(Default, Clone)]
pub struct InMemoryPaymentGateway {
    records: Arc<RwLock<Vec<PaymentRecord>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryPaymentGateway {
    /// Creates a new, empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service pre-loaded with `records`, e.g. from a seed file.
    ///
    /// Records without an opaque id get one assigned.
    pub fn with_records(records: impl IntoIterator<Item = PaymentRecord>) -> Self {
        let gateway = Self::new();
        let seeded = records
            .into_iter()
            .map(|mut record| {
                if record.id.is_none() {
                    record.id = Some(gateway.allocate_id());
                }
                record
            })
            .collect();
        Self {
            records: Arc::new(RwLock::new(seeded)),
            next_id: gateway.next_id,
        }
    }

    /// Snapshot of every stored record, inactive ones included.
    pub async fn snapshot(&self) -> Vec<PaymentRecord> {
        self.records.read().await.clone()
    }

    fn allocate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{n:024x}")
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn fetch_payments(&self, criteria: &FilterCriteria) -> Result<Vec<WirePaymentRecord>> {
        let records = self.records.read().await;
        let found: Vec<WirePaymentRecord> = records
            .iter()
            .filter(|r| r.active && criteria.matches(r))
            .cloned()
            .map(WirePaymentRecord::from)
            .collect();
        debug!(?criteria, found = found.len(), "listed payments");
        Ok(found)
    }

    async fn create_payment(&self, payment: &NewPayment) -> Result<WirePaymentRecord> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.payment_id == payment.payment_id) {
            return Err(PaymentError::BusinessRule(format!(
                "payment id {} already exists",
                payment.payment_id
            )));
        }
        let record = payment.clone().into_record(self.allocate_id());
        records.push(record.clone());
        Ok(record.into())
    }

    async fn set_status(&self, payment_id: u64, new_status: PaymentStatus) -> Result<String> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.payment_id == payment_id && r.active)
            .ok_or_else(|| PaymentError::NotFound(format!("payment {payment_id}")))?;

        if !record.status.can_transition_to(new_status) {
            warn!(payment_id, from = %record.status, to = %new_status, "status change refused");
            return Err(PaymentError::BusinessRule(format!(
                "cannot move payment {payment_id} from {} to {new_status}",
                record.status
            )));
        }

        record.status = new_status;
        Ok(format!("payment {payment_id} moved to {new_status}"))
    }

    async fn deactivate(&self, id: &str) -> Result<String> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| PaymentError::NotFound(format!("payment {id}")))?;

        if record.status != PaymentStatus::PendingProcessing {
            return Err(PaymentError::BusinessRule(format!(
                "payment {id} is {}; only pending payments can be deactivated",
                record.status
            )));
        }

        record.active = false;
        Ok(format!("payment {id} deactivated"))
    }
}
