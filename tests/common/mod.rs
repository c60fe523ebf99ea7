#![allow(dead_code)]

use async_trait::async_trait;
use pagamento_console::application::controller::PaymentListController;
use pagamento_console::application::notifications::NotificationBus;
use pagamento_console::domain::filter::FilterCriteria;
use pagamento_console::domain::pagination::PageSize;
use pagamento_console::domain::payment::{
    NewPayment, PaymentMethod, PaymentStatus, WirePaymentRecord,
};
use pagamento_console::domain::ports::PaymentGateway;
use pagamento_console::error::{PaymentError, Result};
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEBOUNCE: Duration = Duration::from_millis(1000);

pub fn wire_record(payment_id: u64, status: &str, active: bool) -> WirePaymentRecord {
    WirePaymentRecord {
        id: Some(format!("{payment_id:024x}")),
        payment_id,
        tax_id: "12345678909".to_string(),
        method: PaymentMethod::Pix,
        card_number: None,
        amount: dec!(10.00),
        status: status.to_string(),
        active,
    }
}

pub fn pending_records(n: u64) -> Vec<WirePaymentRecord> {
    (1..=n)
        .map(|i| wire_record(100_000_000 + i, "PENDENTE_PROCESSAMENTO", true))
        .collect()
}

/// A scriptable payment service that records every call it receives.
#[derive(Default)]
pub struct RecordingGateway {
    records: Mutex<Vec<WirePaymentRecord>>,
    fetches: Mutex<Vec<FilterCriteria>>,
    fetch_delays: Mutex<VecDeque<Duration>>,
    status_calls: Mutex<Vec<(u64, PaymentStatus)>>,
    deactivations: Mutex<Vec<String>>,
    created: Mutex<Vec<u64>>,
    fail_fetch: AtomicBool,
    fail_mutations: AtomicBool,
}

impl RecordingGateway {
    pub fn new(records: Vec<WirePaymentRecord>) -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(records),
            ..Default::default()
        })
    }

    pub fn fetches(&self) -> Vec<FilterCriteria> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn status_calls(&self) -> Vec<(u64, PaymentStatus)> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn deactivations(&self) -> Vec<String> {
        self.deactivations.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<u64> {
        self.created.lock().unwrap().clone()
    }

    /// Delays the next fetch (in call order) by `delay`.
    pub fn delay_next_fetch(&self, delay: Duration) {
        self.fetch_delays.lock().unwrap().push_back(delay);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn fetch_payments(&self, criteria: &FilterCriteria) -> Result<Vec<WirePaymentRecord>> {
        self.fetches.lock().unwrap().push(criteria.clone());
        let delay = self.fetch_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(PaymentError::Transport("connection refused".to_string()));
        }
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| criteria.payment_id.is_none_or(|id| r.payment_id == id))
            .filter(|r| {
                criteria
                    .tax_id
                    .as_deref()
                    .is_none_or(|tax_id| r.tax_id.contains(tax_id))
            })
            .cloned()
            .collect())
    }

    async fn create_payment(&self, payment: &NewPayment) -> Result<WirePaymentRecord> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(PaymentError::Transport("service unavailable".to_string()));
        }
        self.created.lock().unwrap().push(payment.payment_id);
        let record = payment.clone().into_record(format!("{:024x}", payment.payment_id));
        let wire = WirePaymentRecord::from(record);
        self.records.lock().unwrap().push(wire.clone());
        Ok(wire)
    }

    async fn set_status(&self, payment_id: u64, new_status: PaymentStatus) -> Result<String> {
        self.status_calls.lock().unwrap().push((payment_id, new_status));
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(PaymentError::BusinessRule(
                "payment already processed".to_string(),
            ));
        }
        Ok("status update queued".to_string())
    }

    async fn deactivate(&self, id: &str) -> Result<String> {
        self.deactivations.lock().unwrap().push(id.to_string());
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(PaymentError::BusinessRule("payment is not pending".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id.as_deref() == Some(id)) {
            record.active = false;
        }
        Ok("deactivated".to_string())
    }
}

pub fn controller_for(
    gateway: &Arc<RecordingGateway>,
) -> (PaymentListController, NotificationBus) {
    let bus = NotificationBus::new(32);
    let controller =
        PaymentListController::new(gateway.clone(), bus.clone(), DEBOUNCE, PageSize::Ten);
    (controller, bus)
}
