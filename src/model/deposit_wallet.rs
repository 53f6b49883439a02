use std::fmt;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepositWallet {
    pub user_id: Uuid,
    pub address: String,
    pub crypto_currency: String,
}

impl DepositWallet {
    pub fn new(
        user_id: Uuid,
        address: impl Into<String>,
        crypto_currency: impl Into<String>,
    ) -> DepositWallet {
        DepositWallet {
            user_id,
            address: address.into(),
            crypto_currency: crypto_currency.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.address.trim().is_empty()
            && !self.crypto_currency.trim().is_empty()
            && !self.user_id.is_nil()
    }

    pub fn with_address(&self, address: String) -> DepositWallet {
        DepositWallet {
            address,
            ..self.clone()
        }
    }
}

impl fmt::Display for DepositWallet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.crypto_currency, self.address, self.user_id)
    }
}
