use sha3::{Digest, Keccak256};

use super::{NormalizationContext, Normalizer};

const ADDRESS_LENGTH: usize = 40;

/// Accepts `0x` + 40 hex digits in a single case or with a valid EIP-55
/// checksum. The address keeps its case.
pub struct EthereumNormalizer;

impl EthereumNormalizer {
    pub fn new() -> EthereumNormalizer {
        EthereumNormalizer
    }
}

impl Default for EthereumNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_address(address: &str) -> bool {
    let body = match address.strip_prefix("0x") {
        Some(body) => body,
        None => return false,
    };

    if body.len() != ADDRESS_LENGTH
        || !body.chars().all(|c| c.is_ascii_hexdigit())
    {
        return false;
    }

    let all_lower = !body.chars().any(|c| c.is_ascii_uppercase());
    let all_upper = !body.chars().any(|c| c.is_ascii_lowercase());

    all_lower || all_upper || is_checksum_address(body)
}

fn is_checksum_address(body: &str) -> bool {
    let hash = Keccak256::digest(body.to_ascii_lowercase().as_bytes());

    body.chars().enumerate().all(|(i, c)| {
        if !c.is_ascii_alphabetic() {
            return true;
        }

        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        (nibble >= 8) == c.is_ascii_uppercase()
    })
}

impl Normalizer for EthereumNormalizer {
    fn can_normalize(&self, crypto_currency: &str) -> bool {
        crypto_currency == "ETH"
    }

    fn normalize_or_default(
        &self,
        address: &str,
        _context: NormalizationContext,
    ) -> Option<String> {
        if is_valid_address(address) {
            return Some(address.to_owned());
        }

        let prefixed = format!("0x{}", address);

        if is_valid_address(&prefixed) {
            return Some(prefixed);
        }

        None
    }
}
