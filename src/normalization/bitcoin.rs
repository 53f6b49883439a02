use bech32::{FromBase32, Variant};

use super::{Network, NormalizationContext, Normalizer};

const COLORED_ADDRESS_VERSION: u8 = 0x13;
const HASH_LENGTH: usize = 20;

/// Version bytes and segwit prefix of a Bitcoin-like network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub p2pkh: u8,
    pub p2sh: u8,
    pub bech32_hrp: &'static str,
}

impl NetworkParams {
    pub fn bitcoin(network: Network) -> NetworkParams {
        match network {
            Network::Mainnet => NetworkParams {
                p2pkh: 0x00,
                p2sh: 0x05,
                bech32_hrp: "bc",
            },
            Network::Testnet => NetworkParams {
                p2pkh: 0x6f,
                p2sh: 0xc4,
                bech32_hrp: "tb",
            },
            Network::Regtest => NetworkParams {
                p2pkh: 0x6f,
                p2sh: 0xc4,
                bech32_hrp: "bcrt",
            },
        }
    }

    pub fn litecoin(network: Network) -> NetworkParams {
        match network {
            Network::Mainnet => NetworkParams {
                p2pkh: 0x30,
                p2sh: 0x32,
                bech32_hrp: "ltc",
            },
            Network::Testnet => NetworkParams {
                p2pkh: 0x6f,
                p2sh: 0x3a,
                bech32_hrp: "tltc",
            },
            Network::Regtest => NetworkParams {
                p2pkh: 0x6f,
                p2sh: 0x3a,
                bech32_hrp: "rltc",
            },
        }
    }
}

/// Legacy address type, detected from the version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyKind {
    P2PKH,
    P2SH,
}

/// Decodes a base58check address of the given network into its kind
/// and 20-byte hash.
pub fn decode_legacy(
    address: &str,
    params: &NetworkParams,
) -> Option<(LegacyKind, Vec<u8>)> {
    let data = bs58::decode(address).with_check(None).into_vec().ok()?;
    decode_payload(&data, params)
}

fn decode_payload(
    data: &[u8],
    params: &NetworkParams,
) -> Option<(LegacyKind, Vec<u8>)> {
    let (version, hash) = data.split_first()?;

    if hash.len() != HASH_LENGTH {
        return None;
    }

    let kind = if *version == params.p2pkh {
        LegacyKind::P2PKH
    } else if *version == params.p2sh {
        LegacyKind::P2SH
    } else {
        return None;
    };

    Some((kind, hash.to_vec()))
}

/// Validates a bech32 (v0) or bech32m (v1+) segwit address.
pub fn is_segwit(address: &str, params: &NetworkParams) -> bool {
    let (hrp, data, variant) = match bech32::decode(address) {
        Ok(decoded) => decoded,
        Err(_) => return false,
    };

    if hrp != params.bech32_hrp {
        return false;
    }

    let (version, program) = match data.split_first() {
        Some((version, program)) => (version.to_u8(), program),
        None => return false,
    };

    let program = match Vec::<u8>::from_base32(program) {
        Ok(program) => program,
        Err(_) => return false,
    };

    match version {
        0 => {
            variant == Variant::Bech32
                && (program.len() == 20 || program.len() == 32)
        },
        1..=16 => {
            variant == Variant::Bech32m
                && program.len() >= 2
                && program.len() <= 40
        },
        _ => false,
    }
}

/// Re-derives the standard address wrapped by an Open Assets colored
/// address.
fn decode_colored(address: &str, params: &NetworkParams) -> Option<String> {
    let data = bs58::decode(address).with_check(None).into_vec().ok()?;
    let (version, inner) = data.split_first()?;

    if *version != COLORED_ADDRESS_VERSION {
        return None;
    }

    decode_payload(inner, params)?;

    Some(bs58::encode(inner).with_check().into_string())
}

/// Normalizer of Bitcoin and its forks that share the address formats.
pub struct BitcoinNormalizer {
    crypto_currency: &'static str,
    params: NetworkParams,
    colored: bool,
}

impl BitcoinNormalizer {
    pub fn bitcoin(network: Network) -> BitcoinNormalizer {
        BitcoinNormalizer {
            crypto_currency: "BTC",
            params: NetworkParams::bitcoin(network),
            colored: true,
        }
    }

    pub fn litecoin(network: Network) -> BitcoinNormalizer {
        BitcoinNormalizer {
            crypto_currency: "LTC",
            params: NetworkParams::litecoin(network),
            colored: false,
        }
    }
}

impl Normalizer for BitcoinNormalizer {
    fn can_normalize(&self, crypto_currency: &str) -> bool {
        crypto_currency == self.crypto_currency
    }

    fn normalize_or_default(
        &self,
        address: &str,
        _context: NormalizationContext,
    ) -> Option<String> {
        if decode_legacy(address, &self.params).is_some() {
            return Some(address.to_owned());
        }

        if is_segwit(address, &self.params) {
            return Some(address.to_lowercase());
        }

        if self.colored {
            return decode_colored(address, &self.params);
        }

        None
    }
}
