use super::{NormalizationContext, Normalizer};

const ACCOUNT_ID_LENGTH: usize = 20;

/// Splits `address+tag`. Empty parts are ignored.
pub fn split_tag(address: &str) -> (&str, Option<&str>) {
    let mut parts = address.split('+').filter(|part| !part.is_empty());
    let account = parts.next().unwrap_or_default();

    (account, parts.next())
}

fn is_valid_account(address: &str) -> bool {
    match bs58::decode(address)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check(None)
        .into_vec()
    {
        Ok(data) => data.len() == ACCOUNT_ID_LENGTH + 1 && data[0] == 0,
        Err(_) => false,
    }
}

fn parse_tag(tag: &str) -> Option<u32> {
    tag.parse::<u32>().ok().filter(|tag| *tag > 0)
}

/// Validates `address` or `address+tag`. The tag must be a positive
/// 32-bit integer and survives only in wallet context.
pub struct RippleNormalizer;

impl RippleNormalizer {
    pub fn new() -> RippleNormalizer {
        RippleNormalizer
    }
}

impl Default for RippleNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for RippleNormalizer {
    fn can_normalize(&self, crypto_currency: &str) -> bool {
        crypto_currency == "XRP"
    }

    fn normalize_or_default(
        &self,
        address: &str,
        context: NormalizationContext,
    ) -> Option<String> {
        if address.split('+').filter(|part| !part.is_empty()).count() > 2 {
            return None;
        }

        let (account, tag) = split_tag(address);

        if !is_valid_account(account) {
            return None;
        }

        let tag = match tag {
            Some(tag) => Some(parse_tag(tag)?),
            None => None,
        };

        match (context, tag) {
            (NormalizationContext::Wallet, Some(tag)) => {
                Some(format!("{}+{}", account, tag))
            },
            _ => Some(account.to_owned()),
        }
    }
}
