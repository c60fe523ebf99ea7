use crate::domain::payment::{PaymentRecord, PaymentStatus, WirePaymentRecord};
use tracing::warn;

/// Normalises a wire status, falling back to pending for unknown values.
pub fn normalize_status(wire: &str) -> PaymentStatus {
    PaymentStatus::from_wire(wire).unwrap_or_else(|| {
        warn!(status = wire, "unrecognised payment status, treating as pending");
        PaymentStatus::PendingProcessing
    })
}

impl From<WirePaymentRecord> for PaymentRecord {
    fn from(record: WirePaymentRecord) -> Self {
        Self {
            status: normalize_status(&record.status),
            id: record.id,
            payment_id: record.payment_id,
            tax_id: record.tax_id,
            method: record.method,
            card_number: record.card_number,
            amount: record.amount,
            active: record.active,
        }
    }
}

/// Reduces a fetched batch to its active records.
///
/// Inactive records are dropped and every surviving status is normalised.
/// Input order is kept as-is.
pub fn reduce_active(raw: Vec<WirePaymentRecord>) -> Vec<PaymentRecord> {
    raw.into_iter()
        .filter(|record| record.active)
        .map(PaymentRecord::from)
        .collect()
}
