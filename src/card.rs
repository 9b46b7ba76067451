//! Credit card value types.
//!
//! A [`CreditCard`] is immutable once constructed. Construction checks
//! structure only (digits, month range); Luhn validity and expiry are exposed
//! through [`CreditCard::valid`] as a separate check, because processor test
//! numbers (`"1"`, `"4111111111111111"` and friends) intentionally bypass
//! real-world validation when submitted to a sandbox or simulation backend.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// Card brand, derived from the number prefix. Never caller-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    MasterCard,
    Amex,
    Discover,
    /// Short fixture numbers that match no real network, accepted only by
    /// sandbox/simulation backends.
    Bogus,
}

impl Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CardBrand::Visa => "visa",
            CardBrand::MasterCard => "master_card",
            CardBrand::Amex => "amex",
            CardBrand::Discover => "discover",
            CardBrand::Bogus => "bogus",
        };
        write!(f, "{}", s)
    }
}

/// A card number: a non-empty string of ASCII digits.
///
/// `Debug` and `Display` mask everything but the last four digits, so the
/// full PAN never lands in logs by accident.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CardNumber(String);

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("Card number must be a non-empty digit string")]
    InvalidNumber,
    #[error("Expiry month must be between 1 and 12, got {0}")]
    InvalidExpiryMonth(u8),
}

impl CardNumber {
    pub fn new(digits: impl Into<String>) -> Result<Self, CardError> {
        let digits = digits.into();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CardError::InvalidNumber);
        }
        Ok(CardNumber(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first six digits, as real processors echo them back. Empty for
    /// fixture numbers shorter than six digits.
    pub fn bin(&self) -> &str {
        if self.0.len() >= 6 { &self.0[..6] } else { "" }
    }

    pub fn last_four(&self) -> &str {
        let len = self.0.len();
        if len >= 4 { &self.0[len - 4..] } else { &self.0 }
    }

    /// Derives the brand from the number prefix. Anything too short to be a
    /// real PAN is [`CardBrand::Bogus`].
    pub fn brand(&self) -> CardBrand {
        let n = &self.0;
        if n.len() < 12 {
            return CardBrand::Bogus;
        }
        if n.starts_with('4') {
            CardBrand::Visa
        } else if ("51"..="55").contains(&&n[..2]) {
            CardBrand::MasterCard
        } else if n.starts_with("34") || n.starts_with("37") {
            CardBrand::Amex
        } else if n.starts_with("6011") || n.starts_with("65") {
            CardBrand::Discover
        } else {
            CardBrand::Bogus
        }
    }

    /// Luhn checksum. Exposed as a check rather than enforced at
    /// construction; see the module docs.
    pub fn luhn_valid(&self) -> bool {
        let sum: u32 = self
            .0
            .bytes()
            .rev()
            .enumerate()
            .map(|(i, b)| {
                let digit = u32::from(b - b'0');
                if i % 2 == 1 {
                    let doubled = digit * 2;
                    if doubled > 9 { doubled - 9 } else { doubled }
                } else {
                    digit
                }
            })
            .sum();
        sum % 10 == 0
    }

    fn masked(&self) -> String {
        format!("XXXX-XXXX-XXXX-{}", self.last_four())
    }
}

impl Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardNumber({})", self.masked())
    }
}

impl Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl FromStr for CardNumber {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardNumber::new(s)
    }
}

impl Serialize for CardNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CardNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CardNumber::new(s).map_err(serde::de::Error::custom)
    }
}

/// Card expiry, month 1-12 plus a four-digit year.
///
/// `Display` renders the `MM/YYYY` form processors echo back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryDate {
    month: u8,
    year: u16,
}

impl ExpiryDate {
    pub fn new(month: u8, year: u16) -> Result<Self, CardError> {
        if !(1..=12).contains(&month) {
            return Err(CardError::InvalidExpiryMonth(month));
        }
        Ok(ExpiryDate { month, year })
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// A card is good through the last day of its expiry month.
    pub fn is_expired(&self) -> bool {
        let now = Utc::now();
        let (year, month) = (now.year(), now.month() as u8);
        (i32::from(self.year), self.month) < (year, month)
    }
}

impl Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// An immutable credit card: number, expiry, optional verification value,
/// and holder name. Brand is derived via [`CardNumber::brand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    number: CardNumber,
    expiry: ExpiryDate,
    verification_value: Option<String>,
    first_name: String,
    last_name: String,
}

impl CreditCard {
    pub fn new(
        number: CardNumber,
        expiry: ExpiryDate,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        CreditCard {
            number,
            expiry,
            verification_value: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn with_verification_value(mut self, value: impl Into<String>) -> Self {
        self.verification_value = Some(value.into());
        self
    }

    pub fn number(&self) -> &CardNumber {
        &self.number
    }

    pub fn expiry(&self) -> ExpiryDate {
        self.expiry
    }

    pub fn verification_value(&self) -> Option<&str> {
        self.verification_value.as_deref()
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn brand(&self) -> CardBrand {
        self.number.brand()
    }

    /// Full validity check, separate from submission: Luhn, expiry, holder
    /// name. Sandbox fixture numbers fail this and are still submittable.
    pub fn valid(&self) -> bool {
        self.number.luhn_valid()
            && !self.expiry.is_expired()
            && !self.first_name.is_empty()
            && !self.last_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str) -> CreditCard {
        CreditCard::new(
            CardNumber::new(number).unwrap(),
            ExpiryDate::new(9, 2030).unwrap(),
            "Longbob",
            "Longsen",
        )
    }

    #[test]
    fn test_number_rejects_non_digits() {
        assert!(CardNumber::new("4111-1111").is_err());
        assert!(CardNumber::new("").is_err());
        assert!(CardNumber::new("1").is_ok());
    }

    #[test]
    fn test_brand_detection() {
        assert_eq!(card("4111111111111111").brand(), CardBrand::Visa);
        assert_eq!(card("5105105105105100").brand(), CardBrand::MasterCard);
        assert_eq!(card("378282246310005").brand(), CardBrand::Amex);
        assert_eq!(card("6011111111111117").brand(), CardBrand::Discover);
        assert_eq!(card("1").brand(), CardBrand::Bogus);
    }

    #[test]
    fn test_luhn() {
        assert!(CardNumber::new("4111111111111111").unwrap().luhn_valid());
        assert!(!CardNumber::new("4111111111111112").unwrap().luhn_valid());
        // The simulation fixtures are not Luhn-valid and must still construct.
        assert!(!CardNumber::new("1").unwrap().luhn_valid());
    }

    #[test]
    fn test_expiry_bounds() {
        assert!(ExpiryDate::new(0, 2030).is_err());
        assert!(ExpiryDate::new(13, 2030).is_err());
        assert!(ExpiryDate::new(12, 2030).is_ok());
    }

    #[test]
    fn test_expired() {
        assert!(ExpiryDate::new(9, 2012).unwrap().is_expired());
        assert!(!ExpiryDate::new(1, 2099).unwrap().is_expired());
    }

    #[test]
    fn test_expiry_display() {
        assert_eq!(ExpiryDate::new(9, 2012).unwrap().to_string(), "09/2012");
        assert_eq!(ExpiryDate::new(10, 2014).unwrap().to_string(), "10/2014");
    }

    #[test]
    fn test_valid_check_is_separate_from_construction() {
        let fixture = card("1");
        assert!(!fixture.valid());
        let real = card("4111111111111111");
        assert!(real.valid());
    }

    #[test]
    fn test_masking() {
        let number = CardNumber::new("4111111111111111").unwrap();
        assert_eq!(number.to_string(), "XXXX-XXXX-XXXX-1111");
        assert_eq!(format!("{:?}", number), "CardNumber(XXXX-XXXX-XXXX-1111)");
        assert!(!format!("{:?}", number).contains("411111111111"));
    }

    #[test]
    fn test_bin_and_last_four() {
        let number = CardNumber::new("5105105105105100").unwrap();
        assert_eq!(number.bin(), "510510");
        assert_eq!(number.last_four(), "5100");
        assert_eq!(CardNumber::new("1").unwrap().bin(), "");
    }
}
