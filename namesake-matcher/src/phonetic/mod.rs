//! Phonetic encoding of names
//!
//! Every corpus name carries a cached [`PhoneticCode`]; query names are encoded
//! on demand. The stored form of a code is `"PRIMARY:ALTERNATE"`.

mod double_metaphone;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use double_metaphone::double_metaphone;

/// Primary and alternate Double Metaphone keys for a name
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneticCode {
    pub primary: String,
    pub alternate: String,
}

impl PhoneticCode {
    pub fn new(primary: impl Into<String>, alternate: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternate: alternate.into(),
        }
    }

    /// Colon-joined form persisted in the name store
    pub fn to_stored(&self) -> String {
        format!("{}:{}", self.primary, self.alternate)
    }

    /// Decode a stored value
    ///
    /// Keys never contain `:`, so everything after the first colon is the
    /// alternate. A value without a colon decodes with an empty alternate.
    pub fn from_stored(value: &str) -> Self {
        match value.split_once(':') {
            Some((primary, alternate)) => Self::new(primary, alternate),
            None => Self::new(value, ""),
        }
    }
}

impl fmt::Display for PhoneticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.primary, self.alternate)
    }
}

/// Deterministic name → [`PhoneticCode`] encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneticEncoder {
    max_code_length: Option<usize>,
}

impl PhoneticEncoder {
    pub fn new(max_code_length: Option<usize>) -> Self {
        Self { max_code_length }
    }

    pub fn encode(&self, name: &str) -> PhoneticCode {
        let (primary, alternate) = double_metaphone(name, self.max_code_length);
        PhoneticCode { primary, alternate }
    }
}

/// Encode with unbounded code length
pub fn encode(name: &str) -> PhoneticCode {
    PhoneticEncoder::default().encode(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_deterministic() {
        for name in ["Smith", "Schwarzenegger", "Jose", "McLaughlin", ""] {
            assert_eq!(encode(name), encode(name));
        }
    }

    #[test]
    fn test_stored_form() {
        let code = PhoneticCode::new("SM0", "XMT");
        assert_eq!(code.to_stored(), "SM0:XMT");
        assert_eq!(PhoneticCode::from_stored("SM0:XMT"), code);
    }

    #[test]
    fn test_stored_form_with_empty_alternate() {
        let code = PhoneticCode::new("JN", "");
        assert_eq!(code.to_stored(), "JN:");
        assert_eq!(PhoneticCode::from_stored("JN:"), code);
    }

    #[test]
    fn test_stored_value_without_colon_decodes_leniently() {
        assert_eq!(PhoneticCode::from_stored("TYL"), PhoneticCode::new("TYL", ""));
        assert_eq!(PhoneticCode::from_stored(""), PhoneticCode::default());
    }

    #[test]
    fn test_encoder_respects_max_length() {
        let encoder = PhoneticEncoder::new(Some(2));
        let code = encoder.encode("Robert");
        assert_eq!(code, PhoneticCode::new("RP", "RP"));
    }
}
