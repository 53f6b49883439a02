use std::{collections::HashSet, io, sync::Arc};

use csv::{QuoteStyle, Reader, ReaderBuilder, StringRecord, WriterBuilder};
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::Error,
    model::{Transaction, TransactionType},
    normalization::AddressNormalizer,
};

pub const REPORT_HEADER: [&str; 5] = [
    "user-id",
    "cryptocurrency",
    "transaction-type",
    "transaction-hash",
    "output-address",
];

/// Writes transactions as raw comma separated values. Nothing is quoted,
/// the header is written even for an empty set.
pub struct TransactionsReportWriter;

impl TransactionsReportWriter {
    pub fn write<'a, W, I>(writer: W, transactions: I) -> Result<usize, Error>
    where
        W: io::Write,
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut csv = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);
        let mut count = 0;

        csv.write_record(REPORT_HEADER)?;

        for tx in transactions {
            let user_id = tx.user_id.to_string();
            csv.write_record([
                user_id.as_str(),
                tx.crypto_currency.as_str(),
                tx.r#type.as_report_value(),
                tx.hash.as_str(),
                tx.output_address.as_str(),
            ])?;
            count += 1;
        }

        csv.flush()?;

        Ok(count)
    }

    pub fn to_bytes<'a, I>(transactions: I) -> Result<Vec<u8>, Error>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut buffer = Vec::new();
        Self::write(&mut buffer, transactions)?;

        Ok(buffer)
    }
}

pub struct TransactionsReportReader {
    normalizer: Arc<AddressNormalizer>,
}

impl TransactionsReportReader {
    pub fn new(normalizer: Arc<AddressNormalizer>) -> TransactionsReportReader {
        TransactionsReportReader { normalizer }
    }

    /// Reads a whole report. The first line is the header and is skipped.
    pub fn read<R: io::Read>(
        &self,
        reader: R,
    ) -> Result<HashSet<Transaction>, Error> {
        let mut transactions = HashSet::new();

        for record in Self::csv(reader).records() {
            let record = record?;
            transactions.insert(self.parse(&record)?);
        }

        Ok(transactions)
    }

    /// Reads a report dropping the records a strict read would reject or
    /// the report builder would skip. Returns the kept transactions and the
    /// number of dropped records.
    pub fn read_valid<R: io::Read>(
        &self,
        reader: R,
    ) -> Result<(HashSet<Transaction>, usize), Error> {
        let mut transactions = HashSet::new();
        let mut dropped = 0;

        for (index, record) in Self::csv(reader).records().enumerate() {
            let line = index + 2;

            match self.parse(&record?) {
                Ok(tx) if tx.is_valid() => {
                    transactions.insert(tx);
                },
                Ok(tx) => {
                    warn!(
                        "Line {} has empty required fields, dropping: {}:{}:{}",
                        line, tx.crypto_currency, tx.hash, tx.user_id
                    );
                    dropped += 1;
                },
                Err(e) => {
                    warn!("Line {} dropped: {}", line, e);
                    dropped += 1;
                },
            }
        }

        Ok((transactions, dropped))
    }

    fn csv<R: io::Read>(reader: R) -> Reader<R> {
        ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(reader)
    }

    fn parse(&self, record: &StringRecord) -> Result<Transaction, Error> {
        if record.len() != 5 {
            return Err(Error::InvalidReportRecord(format!(
                "{}. 5 columns are expected, actual count is {}",
                record.iter().collect::<Vec<&str>>().join(","),
                record.len()
            )));
        }

        let user_id = Uuid::parse_str(&record[0]).map_err(|_| {
            Error::InvalidReportRecord(format!(
                "User ID {} is invalid UUID",
                &record[0]
            ))
        })?;
        let crypto_currency = &record[1];
        let r#type = TransactionType::from_report_value(&record[2]);
        let hash = &record[3];
        let output_address = self
            .normalizer
            .normalize_or_default(&record[4], crypto_currency)
            .ok_or_else(|| {
                Error::InvalidReportRecord(format!(
                    "Address {} is invalid for {}",
                    &record[4], crypto_currency
                ))
            })?;

        Ok(Transaction::new(
            crypto_currency,
            hash,
            user_id,
            output_address,
            r#type,
        ))
    }
}
