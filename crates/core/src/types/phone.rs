//! Phone number normalization.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Argentine country calling code, without the leading `+`.
pub const CALLING_CODE: &str = "54";

/// Digits in a full national number (area code included).
pub const NATIONAL_NUMBER_DIGITS: usize = 10;

/// A phone number normalized to an E.164-like `+<digits>` form.
///
/// This is a best-effort heuristic for Argentine numbers, not a validation
/// against a numbering plan. Normalization never fails: input without any
/// digits becomes the empty phone.
///
/// ## Rules
///
/// After stripping every non-digit character:
/// - no digits left: empty string
/// - starts with `54`: `+` prefixed as-is
/// - at least 10 digits: `+54` prefixed (national number with area code)
/// - anything shorter: `+` prefixed as a passthrough
///
/// ## Examples
///
/// ```
/// use mixperfume_core::NormalizedPhone;
///
/// assert_eq!(NormalizedPhone::parse("11 2345-6789").as_str(), "+541123456789");
/// assert_eq!(NormalizedPhone::parse("+54 9 11 2345-6789").as_str(), "+5491123456789");
/// assert_eq!(NormalizedPhone::parse("4567").as_str(), "+4567");
/// assert!(NormalizedPhone::parse("n/a").is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct NormalizedPhone(String);

impl NormalizedPhone {
    /// Normalize free-form phone input.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Self(String::new());
        }

        if digits.starts_with(CALLING_CODE) {
            return Self(format!("+{digits}"));
        }

        if digits.len() >= NATIONAL_NUMBER_DIGITS {
            return Self(format!("+{CALLING_CODE}{digits}"));
        }

        Self(format!("+{digits}"))
    }

    /// Returns the normalized phone as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the input contained no digits.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the phone, or `None` when it is empty.
    #[must_use]
    pub fn non_empty(&self) -> Option<&str> {
        (!self.is_empty()).then_some(self.0.as_str())
    }
}

/// Normalize an optional phone value; absent input yields the empty phone.
#[must_use]
pub fn normalize_phone(raw: Option<&str>) -> NormalizedPhone {
    NormalizedPhone::parse(raw.unwrap_or_default())
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NormalizedPhone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_number_gets_calling_code() {
        assert_eq!(NormalizedPhone::parse("1123456789").as_str(), "+541123456789");
        assert_eq!(
            NormalizedPhone::parse("(011) 2345-6789").as_str(),
            "+5401123456789"
        );
        assert_eq!(
            NormalizedPhone::parse("351 555 0000 12").as_str(),
            "+54351555000012"
        );
    }

    #[test]
    fn test_calling_code_kept_as_is() {
        assert_eq!(
            NormalizedPhone::parse("+54 9 11 2345-6789").as_str(),
            "+5491123456789"
        );
        // Short input that happens to start with 54 is not re-prefixed
        assert_eq!(NormalizedPhone::parse("5411").as_str(), "+5411");
    }

    #[test]
    fn test_short_input_passthrough() {
        assert_eq!(NormalizedPhone::parse("4567-890").as_str(), "+4567890");
        assert_eq!(NormalizedPhone::parse("1").as_str(), "+1");
    }

    #[test]
    fn test_no_digits_is_empty() {
        assert!(NormalizedPhone::parse("").is_empty());
        assert!(NormalizedPhone::parse("   ").is_empty());
        assert!(NormalizedPhone::parse("sin teléfono").is_empty());
        assert!(normalize_phone(None).is_empty());
        assert_eq!(normalize_phone(None).non_empty(), None);
    }

    #[test]
    fn test_every_long_national_number_gets_prefixed() {
        for len in NATIONAL_NUMBER_DIGITS..=15 {
            let digits: String = "9876543210123456".chars().take(len).collect();
            assert_eq!(
                NormalizedPhone::parse(&digits).as_str(),
                format!("+54{digits}")
            );
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "",
            "abc",
            "1123456789",
            "+54 9 11 2345-6789",
            "4567",
            "0054 11 1234 5678",
            "(0351) 15-555-1234",
            "54",
        ];

        for input in inputs {
            let once = NormalizedPhone::parse(input);
            let twice = NormalizedPhone::parse(once.as_str());
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let phone = NormalizedPhone::parse("1123456789");
        let json = serde_json::to_string(&phone).unwrap_or_default();
        assert_eq!(json, "\"+541123456789\"");
        assert_eq!(phone.to_string(), "+541123456789");
    }
}
