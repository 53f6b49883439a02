use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_report_value(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "received",
            TransactionType::Withdrawal => "sent",
        }
    }

    /// `sent` is a withdrawal, anything else is read as a deposit.
    pub fn from_report_value(value: &str) -> TransactionType {
        match value {
            "sent" => TransactionType::Withdrawal,
            _ => TransactionType::Deposit,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_report_value())
    }
}

/// Exported transaction. Equality over all five fields is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transaction {
    pub crypto_currency: String,
    pub hash: String,
    pub user_id: Uuid,
    pub output_address: String,
    pub r#type: TransactionType,
}

impl Transaction {
    pub fn new(
        crypto_currency: impl Into<String>,
        hash: impl Into<String>,
        user_id: Uuid,
        output_address: impl Into<String>,
        r#type: TransactionType,
    ) -> Transaction {
        Transaction {
            crypto_currency: crypto_currency.into(),
            hash: hash.into(),
            user_id,
            output_address: output_address.into(),
            r#type,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.hash.trim().is_empty()
            && !self.crypto_currency.trim().is_empty()
            && !self.user_id.is_nil()
    }

    pub fn with_output_address(&self, output_address: String) -> Transaction {
        Transaction {
            output_address,
            ..self.clone()
        }
    }
}
