//! Turns the free-text search box and the status selector into a query.
//!
//! The search box accepts either a taxpayer id (CPF/CNPJ, with or without
//! punctuation) or a numeric payment id. Which one the user meant is decided
//! by digit count alone: 11 or 14 digits is always a tax id.

use crate::domain::payment::{CNPJ_LEN, CPF_LEN, PaymentRecord, PaymentStatus, strip_non_digits};
use crate::error::{PaymentError, Result};
use std::fmt;
use std::str::FromStr;

/// Message shown when the search text is neither a tax id nor a payment id.
pub const INVALID_SEARCH_FORMAT: &str =
    "Invalid search format: use 11 digits for CPF or 14 for CNPJ";

/// Value of the status selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PaymentStatus),
}

impl FromStr for StatusFilter {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" | "todos" => Ok(StatusFilter::All),
            _ => s.parse().map(StatusFilter::Only),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => fmt::Display::fmt(status, f),
        }
    }
}

/// Structured list query sent to the payment service.
///
/// At most one of `payment_id` and `tax_id` is ever set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub payment_id: Option<u64>,
    pub tax_id: Option<String>,
    pub status: Option<PaymentStatus>,
}

impl FilterCriteria {
    pub fn is_unconstrained(&self) -> bool {
        self.payment_id.is_none() && self.tax_id.is_none() && self.status.is_none()
    }

    /// Query-string pairs in the service's parameter names.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.payment_id {
            params.push(("idPagamento", id.to_string()));
        }
        if let Some(tax_id) = &self.tax_id {
            params.push(("cpfCnpj", tax_id.clone()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_wire().to_string()));
        }
        params
    }

    /// Server-side matching: `(payment id OR tax id substring) AND status`.
    pub fn matches(&self, record: &PaymentRecord) -> bool {
        let id_match = self.payment_id.map(|id| record.payment_id == id);
        let tax_match = self
            .tax_id
            .as_deref()
            .map(|tax_id| record.tax_id.contains(tax_id));

        let either = match (id_match, tax_match) {
            (None, None) => true,
            (a, b) => a.unwrap_or(false) || b.unwrap_or(false),
        };

        either && self.status.is_none_or(|status| record.status == status)
    }
}

fn is_tax_id_length(digits: &str) -> bool {
    digits.len() == CPF_LEN || digits.len() == CNPJ_LEN
}

/// Classifies the search text and status selector into a [`FilterCriteria`].
///
/// Empty search text adds no id constraint. Text that is neither a tax id
/// nor a plain integer is rejected with [`PaymentError::Validation`].
pub fn classify(search_text: &str, status: StatusFilter) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::default();
    let trimmed = search_text.trim();

    if !trimmed.is_empty() {
        let digits = strip_non_digits(trimmed);

        if is_tax_id_length(&digits) {
            criteria.tax_id = Some(digits);
        } else if trimmed.chars().all(|c| c.is_ascii_digit()) {
            let id = trimmed
                .parse::<u64>()
                .map_err(|_| PaymentError::Validation(INVALID_SEARCH_FORMAT.to_string()))?;
            criteria.payment_id = Some(id);
        } else {
            // Separators may be embedded anywhere, so look at the digits once more.
            let digits = strip_non_digits(trimmed);
            if is_tax_id_length(&digits) {
                criteria.tax_id = Some(digits);
            } else {
                return Err(PaymentError::Validation(INVALID_SEARCH_FORMAT.to_string()));
            }
        }
    }

    if let StatusFilter::Only(status) = status {
        criteria.status = Some(status);
    }

    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentMethod;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn record(payment_id: u64, tax_id: &str, status: PaymentStatus) -> PaymentRecord {
        PaymentRecord {
            id: Some(format!("id-{payment_id}")),
            payment_id,
            tax_id: tax_id.to_string(),
            method: PaymentMethod::Pix,
            card_number: None,
            amount: dec!(10.00),
            status,
            active: true,
        }
    }

    #[test]
    fn test_formatted_cpf_becomes_tax_id() {
        let criteria = classify("123.456.789-09", StatusFilter::All).unwrap();
        assert_eq!(criteria.tax_id.as_deref(), Some("12345678909"));
        assert_eq!(criteria.payment_id, None);
    }

    #[test]
    fn test_formatted_cnpj_becomes_tax_id() {
        let criteria = classify(" 12.345.678/0001-95 ", StatusFilter::All).unwrap();
        assert_eq!(criteria.tax_id.as_deref(), Some("12345678000195"));
    }

    #[test]
    fn test_plain_integer_becomes_payment_id() {
        let criteria = classify("123456", StatusFilter::All).unwrap();
        assert_eq!(criteria.payment_id, Some(123456));
        assert_eq!(criteria.tax_id, None);
    }

    #[test]
    fn test_empty_search_is_unconstrained() {
        let criteria = classify("   ", StatusFilter::All).unwrap();
        assert!(criteria.is_unconstrained());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            classify("abc", StatusFilter::All),
            Err(PaymentError::Validation(_))
        ));
        assert!(matches!(
            classify("12-34", StatusFilter::All),
            Err(PaymentError::Validation(_))
        ));
    }

    #[test]
    fn test_integer_overflow_is_rejected() {
        assert!(classify("123456789012345678901234", StatusFilter::All).is_err());
    }

    #[test]
    fn test_status_selection_is_copied() {
        let criteria = classify(
            "",
            StatusFilter::Only(PaymentStatus::ProcessedFailure),
        )
        .unwrap();
        assert_eq!(criteria.status, Some(PaymentStatus::ProcessedFailure));
        assert_eq!(criteria.payment_id, None);
    }

    #[test]
    fn test_status_filter_from_str() {
        assert_eq!("Todos".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "PROCESSADO_SUCESSO".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(PaymentStatus::ProcessedSuccess)
        );
        assert!("bogus".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_query_params() {
        let criteria = FilterCriteria {
            payment_id: Some(42),
            tax_id: None,
            status: Some(PaymentStatus::PendingProcessing),
        };
        assert_eq!(
            criteria.query_params(),
            vec![
                ("idPagamento", "42".to_string()),
                ("status", "PENDENTE_PROCESSAMENTO".to_string()),
            ]
        );
    }

    #[test]
    fn test_matches() {
        let pending = record(111111111, "12345678909", PaymentStatus::PendingProcessing);
        let done = record(222222222, "98765432100", PaymentStatus::ProcessedSuccess);

        let by_tax = FilterCriteria {
            tax_id: Some("45678".to_string()),
            ..Default::default()
        };
        assert!(by_tax.matches(&pending));
        assert!(!by_tax.matches(&done));

        let by_status = FilterCriteria {
            status: Some(PaymentStatus::ProcessedSuccess),
            ..Default::default()
        };
        assert!(!by_status.matches(&pending));
        assert!(by_status.matches(&done));

        assert!(FilterCriteria::default().matches(&pending));
    }

    proptest! {
        #[test]
        fn prop_tax_id_lengths_always_yield_tax_id(
            digits in prop_oneof!["[0-9]{11}", "[0-9]{14}"],
            sep in "[ .\\-/]{0,3}",
        ) {
            let text = format!("{}{}{}", &digits[..3], sep, &digits[3..]);
            let criteria = classify(&text, StatusFilter::All).unwrap();
            prop_assert_eq!(criteria.tax_id.as_deref(), Some(digits.as_str()));
            prop_assert_eq!(criteria.payment_id, None);
        }

        #[test]
        fn prop_other_digit_strings_yield_payment_id(id in 1u64..10_000_000_000u64) {
            let text = id.to_string();
            prop_assume!(text.len() != 11 && text.len() != 14);
            let criteria = classify(&text, StatusFilter::All).unwrap();
            prop_assert_eq!(criteria.payment_id, Some(id));
            prop_assert_eq!(criteria.tax_id, None);
        }

        #[test]
        fn prop_letters_without_tax_id_are_rejected(text in "[a-z]{1,8}[0-9]{0,5}") {
            prop_assert!(classify(&text, StatusFilter::All).is_err());
        }
    }
}
