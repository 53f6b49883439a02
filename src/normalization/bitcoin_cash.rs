use super::{
    bitcoin::{decode_legacy, NetworkParams},
    cashaddr, Network, NormalizationContext, Normalizer,
};

/// Brings legacy and CashAddr addresses to the prefixed CashAddr form.
pub struct BitcoinCashNormalizer {
    prefix: &'static str,
    legacy: NetworkParams,
}

impl BitcoinCashNormalizer {
    pub fn new(network: Network) -> BitcoinCashNormalizer {
        let prefix = match network {
            Network::Mainnet => "bitcoincash",
            Network::Testnet => "bchtest",
            Network::Regtest => "bchreg",
        };

        BitcoinCashNormalizer {
            prefix,
            legacy: NetworkParams::bitcoin(network),
        }
    }

    fn from_legacy(&self, address: &str) -> Option<String> {
        let (kind, hash) = decode_legacy(address, &self.legacy)?;
        cashaddr::encode(self.prefix, kind, &hash)
    }

    fn from_cashaddr(&self, address: &str) -> Option<String> {
        let (prefix, kind, hash) = cashaddr::decode(address)?;

        if prefix != self.prefix {
            return None;
        }

        cashaddr::encode(self.prefix, kind, &hash)
    }
}

impl Normalizer for BitcoinCashNormalizer {
    fn can_normalize(&self, crypto_currency: &str) -> bool {
        crypto_currency == "BCH"
    }

    fn normalize_or_default(
        &self,
        address: &str,
        _context: NormalizationContext,
    ) -> Option<String> {
        self.from_legacy(address)
            .or_else(|| self.from_cashaddr(address))
            .or_else(|| {
                self.from_cashaddr(&format!("{}:{}", self.prefix, address))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SATOSHI: &str = "bitcoincash:qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy";

    fn bch(address: &str) -> Option<String> {
        BitcoinCashNormalizer::new(Network::Mainnet)
            .normalize_or_default(address, NormalizationContext::Transaction)
    }

    #[test]
    fn legacy_is_converted() {
        assert_eq!(bch("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"), Some(String::from(SATOSHI)));
        assert_eq!(
            bch("3N7cHrmKeEsjuFTx39WyGoZwAikAVSFoWX"),
            Some(String::from(
                "bitcoincash:prsqjtlny2xyndjgtj0xf33qa39dpsfwmsqptzc2ct"
            ))
        );
    }

    #[test]
    fn cashaddr_with_and_without_prefix() {
        assert_eq!(bch(SATOSHI), Some(String::from(SATOSHI)));
        assert_eq!(
            bch("qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy"),
            Some(String::from(SATOSHI))
        );
        assert_eq!(bch(&SATOSHI.to_uppercase()), Some(String::from(SATOSHI)));
        assert_eq!(
            bch("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"),
            Some(String::from(
                "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"
            ))
        );
    }

    #[test]
    fn foreign_addresses_are_rejected() {
        assert_eq!(bch("LW9Tcj39N1f51DHDoue8xWE2cGEE1FKUVF"), None);
        assert_eq!(
            bch("bchtest:qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy"),
            None
        );
        assert_eq!(bch("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"), None);
    }
}
