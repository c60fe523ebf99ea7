use crate::error::{PaymentError, Result};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Range of client-generated payment ids (always nine digits).
pub const PAYMENT_ID_RANGE: RangeInclusive<u64> = 100_000_000..=999_999_999;

/// Digit count of an individual taxpayer id (CPF).
pub const CPF_LEN: usize = 11;
/// Digit count of a company taxpayer id (CNPJ).
pub const CNPJ_LEN: usize = 14;
/// Digit count of a card number.
pub const CARD_NUMBER_LEN: usize = 16;

/// Drops every character that is not an ASCII digit.
pub fn strip_non_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Lifecycle state of a payment as tracked by the payment service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "PENDENTE_PROCESSAMENTO")]
    PendingProcessing,
    #[serde(rename = "PROCESSADO_SUCESSO")]
    ProcessedSuccess,
    #[serde(rename = "PROCESSADO_FALHA")]
    ProcessedFailure,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::PendingProcessing,
        PaymentStatus::ProcessedSuccess,
        PaymentStatus::ProcessedFailure,
    ];

    /// The spelling used on the wire.
    pub fn as_wire(&self) -> &'static str {
        match self {
            PaymentStatus::PendingProcessing => "PENDENTE_PROCESSAMENTO",
            PaymentStatus::ProcessedSuccess => "PROCESSADO_SUCESSO",
            PaymentStatus::ProcessedFailure => "PROCESSADO_FALHA",
        }
    }

    /// Parses a wire spelling, returning `None` for anything unrecognised.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_wire() == value)
    }

    /// Human readable label shown in list views.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::PendingProcessing => "Pendente Processamento",
            PaymentStatus::ProcessedSuccess => "Processado com Sucesso",
            PaymentStatus::ProcessedFailure => "Processado com Falha",
        }
    }

    /// Whether the payment service accepts a move from `self` to `next`.
    ///
    /// A successful payment is final. A pending payment may be processed
    /// either way, and a failed one may be sent back to pending.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match (self, next) {
            (PaymentStatus::ProcessedSuccess, _) => false,
            (PaymentStatus::PendingProcessing, PaymentStatus::ProcessedSuccess)
            | (PaymentStatus::PendingProcessing, PaymentStatus::ProcessedFailure) => true,
            (PaymentStatus::ProcessedFailure, PaymentStatus::PendingProcessing) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentError;

    /// Accepts the wire spelling or the English name, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        if let Some(status) = Self::from_wire(&upper) {
            return Ok(status);
        }
        match upper.as_str() {
            "PENDING_PROCESSING" => Ok(PaymentStatus::PendingProcessing),
            "PROCESSED_SUCCESS" => Ok(PaymentStatus::ProcessedSuccess),
            "PROCESSED_FAILURE" => Ok(PaymentStatus::ProcessedFailure),
            _ => Err(PaymentError::Validation(format!("unknown payment status '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "PIX")]
    Pix,
    #[serde(rename = "BOLETO")]
    Boleto,
    #[serde(rename = "CARTAO_CREDITO")]
    CreditCard,
    #[serde(rename = "CARTAO_DEBITO")]
    DebitCard,
}

impl PaymentMethod {
    pub fn is_card(&self) -> bool {
        matches!(self, PaymentMethod::CreditCard | PaymentMethod::DebitCard)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Boleto => "Boleto",
            PaymentMethod::CreditCard => "Cartão de Crédito",
            PaymentMethod::DebitCard => "Cartão de Débito",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PIX" => Ok(PaymentMethod::Pix),
            "BOLETO" => Ok(PaymentMethod::Boleto),
            "CARTAO_CREDITO" | "CREDIT_CARD" => Ok(PaymentMethod::CreditCard),
            "CARTAO_DEBITO" | "DEBIT_CARD" => Ok(PaymentMethod::DebitCard),
            _ => Err(PaymentError::Validation(format!("unknown payment method '{s}'"))),
        }
    }
}

/// A payer taxpayer id in canonical digits-only form.
///
/// Holds exactly 11 (CPF) or 14 (CNPJ) digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaxId(String);

impl TaxId {
    /// Strips formatting characters and checks the digit count.
    pub fn parse(text: &str) -> Result<Self> {
        let digits = strip_non_digits(text);
        if digits.len() == CPF_LEN || digits.len() == CNPJ_LEN {
            Ok(Self(digits))
        } else {
            Err(PaymentError::Validation(
                "tax id must have 11 digits (CPF) or 14 digits (CNPJ)".to_string(),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_cnpj(&self) -> bool {
        self.0.len() == CNPJ_LEN
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a strictly positive payment amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::Validation(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

fn check_payment_id(payment_id: u64) -> Result<()> {
    if PAYMENT_ID_RANGE.contains(&payment_id) {
        Ok(())
    } else {
        Err(PaymentError::Validation(format!(
            "payment id {payment_id} must be a 9-digit positive integer"
        )))
    }
}

fn default_active() -> bool {
    true
}

/// A payment exactly as the payment service sends it.
///
/// `status` stays free text until the list reducer normalises it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirePaymentRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "idPagamento")]
    pub payment_id: u64,
    #[serde(rename = "cpfCnpj")]
    pub tax_id: String,
    #[serde(rename = "metodoPagamento")]
    pub method: PaymentMethod,
    #[serde(rename = "numeroCartao", default)]
    pub card_number: Option<String>,
    #[serde(rename = "valor", with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
}

/// A payment with its status in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Option<String>,
    #[serde(rename = "idPagamento")]
    pub payment_id: u64,
    #[serde(rename = "cpfCnpj")]
    pub tax_id: String,
    #[serde(rename = "metodoPagamento")]
    pub method: PaymentMethod,
    #[serde(rename = "numeroCartao")]
    pub card_number: Option<String>,
    #[serde(rename = "valor", with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub status: PaymentStatus,
    #[serde(rename = "ativo")]
    pub active: bool,
}

impl PaymentRecord {
    /// Checks the stored-record invariants: a 9-digit payment id, a
    /// digits-only tax id of 11 or 14 digits, a positive amount, and a
    /// 16-digit card number present exactly when the method is a card.
    pub fn validate(&self) -> Result<()> {
        check_payment_id(self.payment_id)?;
        if TaxId::parse(&self.tax_id)?.as_str() != self.tax_id {
            return Err(PaymentError::Validation(format!(
                "tax id '{}' must contain digits only",
                self.tax_id
            )));
        }
        Amount::new(self.amount)?;

        match (self.method.is_card(), self.card_number.as_deref()) {
            (true, Some(card))
                if card.len() == CARD_NUMBER_LEN && card.chars().all(|c| c.is_ascii_digit()) =>
            {
                Ok(())
            }
            (true, _) => Err(PaymentError::Validation(format!(
                "card number must have {CARD_NUMBER_LEN} digits"
            ))),
            (false, Some(_)) => Err(PaymentError::Validation(format!(
                "{} payments carry no card number",
                self.method.label()
            ))),
            (false, None) => Ok(()),
        }
    }
}

impl From<PaymentRecord> for WirePaymentRecord {
    fn from(record: PaymentRecord) -> Self {
        Self {
            id: record.id,
            payment_id: record.payment_id,
            tax_id: record.tax_id,
            method: record.method,
            card_number: record.card_number,
            amount: record.amount,
            status: record.status.as_wire().to_string(),
            active: record.active,
        }
    }
}

/// Payload for registering a new payment.
///
/// The constructor enforces the record invariants: a valid tax id, a
/// positive amount, and a card number if and only if the method is a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPayment {
    #[serde(rename = "idPagamento")]
    pub payment_id: u64,
    #[serde(rename = "cpfCnpj")]
    pub tax_id: TaxId,
    #[serde(rename = "metodoPagamento")]
    pub method: PaymentMethod,
    #[serde(rename = "numeroCartao", skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(rename = "valor")]
    pub amount: Amount,
}

impl NewPayment {
    /// Builds a payload with a freshly generated nine-digit payment id.
    pub fn new(
        tax_id: &str,
        method: PaymentMethod,
        card_number: Option<&str>,
        amount: Decimal,
    ) -> Result<Self> {
        let payment_id = rand::thread_rng().gen_range(PAYMENT_ID_RANGE);
        Self::with_payment_id(payment_id, tax_id, method, card_number, amount)
    }

    pub fn with_payment_id(
        payment_id: u64,
        tax_id: &str,
        method: PaymentMethod,
        card_number: Option<&str>,
        amount: Decimal,
    ) -> Result<Self> {
        check_payment_id(payment_id)?;
        let tax_id = TaxId::parse(tax_id)?;
        let amount = Amount::new(amount)?;

        // Card numbers typed for non-card methods are discarded.
        let card_number = if method.is_card() {
            let digits = card_number.map(strip_non_digits).unwrap_or_default();
            if digits.len() != CARD_NUMBER_LEN {
                return Err(PaymentError::Validation(format!(
                    "card number must have {CARD_NUMBER_LEN} digits"
                )));
            }
            Some(digits)
        } else {
            None
        };

        Ok(Self {
            payment_id,
            tax_id,
            method,
            card_number,
            amount,
        })
    }

    /// The record the payment service stores for this payload.
    pub fn into_record(self, id: String) -> PaymentRecord {
        PaymentRecord {
            id: Some(id),
            payment_id: self.payment_id,
            tax_id: self.tax_id.0,
            method: self.method,
            card_number: self.card_number,
            amount: self.amount.value(),
            status: PaymentStatus::PendingProcessing,
            active: true,
        }
    }
}
