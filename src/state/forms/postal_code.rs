//! Brazilian postal code (CEP) normalization

use std::fmt::{Display, Formatter};

/// An 8-digit postal code, digits only.
///
/// Only obtainable through [`NormalizedPostalCode::parse`], so holding one
/// means the lookup guard has passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPostalCode(String);

impl NormalizedPostalCode {
    pub const LEN: usize = 8;

    /// Strip every character that is not an ASCII decimal digit
    pub fn normalize(raw: &str) -> String {
        raw.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Normalize `raw` and accept it only when exactly 8 digits remain
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = Self::normalize(raw);
        (digits.len() == Self::LEN).then_some(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NormalizedPostalCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_mask() {
        assert_eq!(NormalizedPostalCode::normalize("01001-000"), "01001000");
        assert_eq!(NormalizedPostalCode::normalize(" 20.040-020 "), "20040020");
    }

    #[test]
    fn test_normalize_ignores_non_ascii_digits() {
        // Arabic-Indic digits are not decimal ASCII digits
        assert_eq!(NormalizedPostalCode::normalize("٠١٢3"), "3");
    }

    #[test]
    fn test_parse_accepts_exactly_eight_digits() {
        let code = NormalizedPostalCode::parse("01001-000").unwrap();
        assert_eq!(code.as_str(), "01001000");
        assert_eq!(code.to_string(), "01001000");
    }

    #[test]
    fn test_parse_rejects_other_lengths() {
        for raw in ["", "123", "0100100", "010010001", "abc-defgh", "01001-00a"] {
            assert!(NormalizedPostalCode::parse(raw).is_none(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_parse_accepts_digits_mixed_with_letters() {
        assert!(NormalizedPostalCode::parse("a1b2c3d4e5f6g7h8").is_some());
    }
}
