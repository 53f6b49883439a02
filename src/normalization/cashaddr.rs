//! CashAddr codec (BCH address format)

use super::bitcoin::LegacyKind;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const GENERATOR: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];
const CHECKSUM_LENGTH: usize = 8;

fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;

    for value in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(*value);

        for (i, generator) in GENERATOR.iter().enumerate() {
            if c0 & (1 << i) != 0 {
                c ^= generator;
            }
        }
    }

    c ^ 1
}

fn expand_prefix(prefix: &str) -> Vec<u8> {
    prefix
        .bytes()
        .map(|byte| byte & 0x1f)
        .chain(std::iter::once(0))
        .collect()
}

fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max = (1u32 << to) - 1;
    let max_acc = (1u32 << (from + to - 1)) - 1;
    let mut result = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for value in data {
        let value = u32::from(*value);

        if value >> from != 0 {
            return None;
        }

        acc = ((acc << from) | value) & max_acc;
        bits += from;

        while bits >= to {
            bits -= to;
            result.push(((acc >> bits) & max) as u8);
        }
    }

    if pad {
        if bits > 0 {
            result.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return None;
    }

    Some(result)
}

fn size_code(length: usize) -> Option<u8> {
    match length {
        20 => Some(0),
        24 => Some(1),
        28 => Some(2),
        32 => Some(3),
        40 => Some(4),
        48 => Some(5),
        56 => Some(6),
        64 => Some(7),
        _ => None,
    }
}

fn type_code(kind: LegacyKind) -> u8 {
    match kind {
        LegacyKind::P2PKH => 0,
        LegacyKind::P2SH => 1,
    }
}

/// Encodes `prefix:payload`. The version byte is prepended to the hash
/// before the 8-to-5 bit conversion.
pub fn encode(prefix: &str, kind: LegacyKind, hash: &[u8]) -> Option<String> {
    let version = (type_code(kind) << 3) | size_code(hash.len())?;
    let mut raw = Vec::with_capacity(hash.len() + 1);
    raw.push(version);
    raw.extend_from_slice(hash);

    let payload = convert_bits(&raw, 8, 5, true)?;

    let mut values = expand_prefix(prefix);
    values.extend_from_slice(&payload);
    values.extend_from_slice(&[0; CHECKSUM_LENGTH]);
    let checksum = polymod(&values);

    let mut address = String::with_capacity(prefix.len() + 1 + payload.len() + CHECKSUM_LENGTH);
    address.push_str(prefix);
    address.push(':');

    for value in &payload {
        address.push(CHARSET[*value as usize] as char);
    }

    for i in 0..CHECKSUM_LENGTH {
        let value = (checksum >> (5 * (CHECKSUM_LENGTH - 1 - i))) & 0x1f;
        address.push(CHARSET[value as usize] as char);
    }

    Some(address)
}

/// Decodes a prefixed CashAddr into lowercase prefix, kind and hash.
/// Mixed-case input is rejected.
pub fn decode(address: &str) -> Option<(String, LegacyKind, Vec<u8>)> {
    let has_lower = address.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = address.chars().any(|c| c.is_ascii_uppercase());

    if has_lower && has_upper {
        return None;
    }

    let address = address.to_ascii_lowercase();
    let (prefix, payload) = address.split_once(':')?;

    if prefix.is_empty() || payload.len() <= CHECKSUM_LENGTH {
        return None;
    }

    let values = payload
        .bytes()
        .map(|byte| CHARSET.iter().position(|c| *c == byte).map(|p| p as u8))
        .collect::<Option<Vec<u8>>>()?;

    let mut checked = expand_prefix(prefix);
    checked.extend_from_slice(&values);

    if polymod(&checked) != 0 {
        return None;
    }

    let data = convert_bits(&values[..values.len() - CHECKSUM_LENGTH], 5, 8, false)?;
    let (version, hash) = data.split_first()?;

    if version & 0x80 != 0 || size_code(hash.len())? != version & 0x07 {
        return None;
    }

    let kind = match (version >> 3) & 0x0f {
        0 => LegacyKind::P2PKH,
        1 => LegacyKind::P2SH,
        _ => return None,
    };

    Some((prefix.to_owned(), kind, hash.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SATOSHI_HASH: &str = "62e907b15cbf27d5425399ebf6f0fb50ebb88f18";

    fn hash() -> Vec<u8> {
        (0..SATOSHI_HASH.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&SATOSHI_HASH[i..i + 2], 16).unwrap())
            .collect()
    }

    #[test]
    fn encode_p2pkh() {
        assert_eq!(
            encode("bitcoincash", LegacyKind::P2PKH, &hash()).unwrap(),
            "bitcoincash:qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy"
        );
    }

    #[test]
    fn decode_address() {
        let (prefix, kind, decoded) =
            decode("bitcoincash:qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy").unwrap();

        assert_eq!(prefix, "bitcoincash");
        assert_eq!(kind, LegacyKind::P2PKH);
        assert_eq!(decoded, hash());

        assert!(decode("BITCOINCASH:QP3WJPA3TJLJ042Z2WV7HAHSLDGWHWY0RQ9SYWJPYY").is_some());
        assert!(decode("bitcoincash:QP3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy").is_none());
        assert!(decode("bitcoincash:qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyz").is_none());
        assert!(decode("qp3wjpa3tjlj042z2wv7hahsldgwhwy0rq9sywjpyy").is_none());
    }
}
