use crate::domain::payment::PaymentRecord;
use crate::error::Result;
use std::io::Write;

/// Writes payment records as CSV, using the same column names as the reader.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments<'a>(
        &mut self,
        payments: impl IntoIterator<Item = &'a PaymentRecord>,
    ) -> Result<()> {
        for payment in payments {
            self.writer.serialize(payment)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
