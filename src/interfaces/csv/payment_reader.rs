use crate::domain::payment::WirePaymentRecord;
use crate::error::{PaymentError, Result};
use std::io::Read;

/// Reads payment records from a CSV source in the service's wire layout.
///
/// Expected header: `id,idPagamento,cpfCnpj,metodoPagamento,numeroCartao,valor,status,ativo`.
/// Empty `id` and `numeroCartao` cells are read as absent.
pub struct PaymentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentReader<R> {
    /// Creates a new `PaymentReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes records.
    pub fn payments(self) -> impl Iterator<Item = Result<WirePaymentRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentMethod;
    use rust_decimal_macros::dec;

    const HEADER: &str = "id,idPagamento,cpfCnpj,metodoPagamento,numeroCartao,valor,status,ativo";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\n\
             a1, 123456789, 12345678909, PIX, , 10.50, PENDENTE_PROCESSAMENTO, true\n\
             , 987654321, 12345678000195, CARTAO_CREDITO, 4111111111111111, 99.9, PROCESSADO_FALHA, false"
        );
        let reader = PaymentReader::new(data.as_bytes());
        let results: Vec<Result<WirePaymentRecord>> = reader.payments().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.id.as_deref(), Some("a1"));
        assert_eq!(first.card_number, None);
        assert_eq!(first.amount, dec!(10.50));
        assert_eq!(first.amount.to_string(), "10.50");

        let second = results[1].as_ref().unwrap();
        assert_eq!(second.id, None);
        assert_eq!(second.method, PaymentMethod::CreditCard);
        assert!(!second.active);
    }

    #[test]
    fn test_reader_keeps_amount_precision() {
        let data = format!(
            "{HEADER}\n\
             a1, 123456789, 12345678909, PIX, , 1234567890123456.78, PENDENTE_PROCESSAMENTO, true\n\
             a2, 123456780, 12345678909, PIX, , 20.50, PENDENTE_PROCESSAMENTO, true"
        );
        let amounts: Vec<String> = PaymentReader::new(data.as_bytes())
            .payments()
            .map(|r| r.unwrap().amount.to_string())
            .collect();

        assert_eq!(amounts, vec!["1234567890123456.78", "20.50"]);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}\na1, 123456789, 12345678909, CHEQUE, , 10, PENDENTE_PROCESSAMENTO, true");
        let reader = PaymentReader::new(data.as_bytes());
        let results: Vec<Result<WirePaymentRecord>> = reader.payments().collect();

        assert!(results[0].is_err());
    }
}
