//! Sequential human-readable codes (`ITM-0001`, `SALE-0042`, ...)
//!
//! Codes are `<PREFIX>-<n>` where `n` is zero-padded to at least
//! [`CODE_DIGITS`] digits. Past 9999 the suffix simply grows wider, so the
//! numeric value, not string order, is the source of truth.

use serde::{Deserialize, Serialize};

/// Minimum width of the numeric suffix
pub const CODE_DIGITS: usize = 4;

/// Entity families that receive sequential codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodePrefix {
    Item,
    Article,
    Material,
    Sale,
    Product,
    Employee,
}

impl CodePrefix {
    pub const ALL: [CodePrefix; 6] = [
        CodePrefix::Item,
        CodePrefix::Article,
        CodePrefix::Material,
        CodePrefix::Sale,
        CodePrefix::Product,
        CodePrefix::Employee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodePrefix::Item => "ITM",
            CodePrefix::Article => "ART",
            CodePrefix::Material => "MAT",
            CodePrefix::Sale => "SALE",
            CodePrefix::Product => "PRD",
            CodePrefix::Employee => "EMP",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl std::fmt::Display for CodePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format sequence number `n` under `prefix`
pub fn format_code(prefix: CodePrefix, n: u64) -> String {
    format!("{}-{:0width$}", prefix.as_str(), n, width = CODE_DIGITS)
}

/// Parse the numeric suffix of a code carrying `prefix`.
///
/// Returns `None` for codes of another family or with a non-numeric suffix.
pub fn parse_code(prefix: CodePrefix, code: &str) -> Option<u64> {
    let suffix = code.strip_prefix(prefix.as_str())?.strip_prefix('-')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Next code after `last_code`, or `<PREFIX>-0001` when there is none
/// (or the last code is not a valid code of this family).
pub fn next_code(prefix: CodePrefix, last_code: Option<&str>) -> String {
    let last = last_code.and_then(|c| parse_code(prefix, c)).unwrap_or(0);
    format_code(prefix, last + 1)
}

/// Highest sequence number among `codes` for `prefix`, 0 if none match
pub fn highest_sequence<'a, I>(prefix: CodePrefix, codes: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    codes
        .into_iter()
        .filter_map(|c| parse_code(prefix, c))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_code() {
        assert_eq!(next_code(CodePrefix::Item, None), "ITM-0001");
        assert_eq!(next_code(CodePrefix::Sale, None), "SALE-0001");
    }

    #[test]
    fn test_next_code_increments_suffix() {
        assert_eq!(next_code(CodePrefix::Item, Some("ITM-0009")), "ITM-0010");
        assert_eq!(next_code(CodePrefix::Article, Some("ART-0999")), "ART-1000");
    }

    #[test]
    fn test_suffix_widens_past_four_digits() {
        assert_eq!(next_code(CodePrefix::Item, Some("ITM-9999")), "ITM-10000");
        assert_eq!(parse_code(CodePrefix::Item, "ITM-10000"), Some(10000));
    }

    #[test]
    fn test_foreign_or_malformed_codes_are_ignored() {
        assert_eq!(parse_code(CodePrefix::Item, "ART-0001"), None);
        assert_eq!(parse_code(CodePrefix::Item, "ITM-"), None);
        assert_eq!(parse_code(CodePrefix::Item, "ITM-00a1"), None);
        assert_eq!(parse_code(CodePrefix::Item, "ITM0001"), None);
        assert_eq!(next_code(CodePrefix::Item, Some("garbage")), "ITM-0001");
    }

    #[test]
    fn test_highest_sequence_is_numeric() {
        let codes = ["ITM-0002", "ITM-10000", "ITM-9999", "SALE-20000"];
        assert_eq!(highest_sequence(CodePrefix::Item, codes), 10000);
        assert_eq!(highest_sequence(CodePrefix::Material, codes), 0);
    }

    #[test]
    fn test_prefix_round_trip() {
        for prefix in CodePrefix::ALL {
            assert_eq!(CodePrefix::from_str(prefix.as_str()), Some(prefix));
        }
        assert_eq!(CodePrefix::from_str("XYZ"), None);
    }
}
