use super::{NormalizationContext, Normalizer};

/// Drops a `?query` suffix and surrounding whitespace.
pub struct GeneralNormalizer;

impl Normalizer for GeneralNormalizer {
    fn can_normalize(&self, _crypto_currency: &str) -> bool {
        true
    }

    fn normalize_or_default(
        &self,
        address: &str,
        _context: NormalizationContext,
    ) -> Option<String> {
        let head = match address.find('?') {
            Some(index) => &address[..index],
            None => address,
        };
        let head = head.trim();

        if head.is_empty() {
            return None;
        }

        Some(head.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(address: &str) -> Option<String> {
        GeneralNormalizer.normalize_or_default(address, NormalizationContext::Transaction)
    }

    #[test]
    fn strips_query_and_whitespace() {
        assert_eq!(normalize(" abc?amount=1 "), Some(String::from("abc")));
        assert_eq!(normalize("abc"), Some(String::from("abc")));
        assert_eq!(normalize(""), None);
        assert_eq!(normalize(" \t"), None);
        assert_eq!(normalize("  ?amount=1"), None);
    }
}
