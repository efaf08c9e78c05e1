// src/utils/phone.rs
//! Tanzanian phone number normalisation.
//!
//! Numbers are converted to `+255` followed by the subscriber digits. Anything
//! that does not match a known local or international shape is passed through
//! untouched, so callers must tolerate malformed values downstream.

pub const COUNTRY_CODE: &str = "255";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized<'a> {
    International(String),
    Passthrough(&'a str),
}

impl Normalized<'_> {
    pub fn into_string(self) -> String {
        match self {
            Normalized::International(number) => number,
            Normalized::Passthrough(raw) => raw.to_string(),
        }
    }
}

/// Applies the rules in order; the first match wins.
pub fn classify(raw: &str) -> Normalized<'_> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 10 && digits.starts_with('0') {
        return Normalized::International(format!("+{}{}", COUNTRY_CODE, &digits[1..]));
    }
    if digits.starts_with(COUNTRY_CODE) && digits.len() >= 12 {
        return Normalized::International(format!("+{}", digits));
    }
    // local number typed without its leading zero
    if digits.starts_with('6') && digits.len() == 9 {
        return Normalized::International(format!("+{}{}", COUNTRY_CODE, digits));
    }

    Normalized::Passthrough(raw)
}

// NOTE: unrecognised input is returned as-is rather than rejected; stricter
// validation needs a decision on what admins expect for foreign numbers.
pub fn normalize(raw: &str) -> String {
    let normalized = classify(raw);
    if let Normalized::Passthrough(original) = &normalized {
        tracing::debug!("Unrecognised phone number format, passing through: {:?}", original);
    }
    normalized.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ten_digit_numbers() {
        assert_eq!(normalize("0712345678"), "+255712345678");
        assert_eq!(normalize("0677 123 456"), "+255677123456");
        assert_eq!(normalize("(0754)-987-654"), "+255754987654");
    }

    #[test]
    fn test_every_zero_prefixed_ten_digit_string() {
        for tail in ["000000000", "123456789", "999999999", "600000001"] {
            let raw = format!("0{}", tail);
            assert_eq!(normalize(&raw), format!("+255{}", tail));
        }
    }

    #[test]
    fn test_international_forms() {
        assert_eq!(normalize("255712345678"), "+255712345678");
        assert_eq!(normalize("+255 712 345 678"), "+255712345678");
        assert_eq!(normalize("2557123456789"), "+2557123456789");
    }

    #[test]
    fn test_missing_leading_zero() {
        assert_eq!(normalize("677123456"), "+255677123456");
        assert_eq!(normalize("712345678"), "712345678");
    }

    #[test]
    fn test_unrecognised_passthrough() {
        assert_eq!(normalize("not-a-number"), "not-a-number");
        assert_eq!(normalize("+1 415 555 1212"), "+1 415 555 1212");
        assert_eq!(normalize(""), "");
        assert_eq!(classify("25571234567"), Normalized::Passthrough("25571234567"));
    }
}
