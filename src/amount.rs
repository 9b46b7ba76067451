//! Money amounts in integer minor currency units.
//!
//! The core never represents an amount as a floating-point value. Amounts are
//! carried as a `u64` count of minor units (cents, pence, yen) paired with a
//! [`Currency`] code. Human-readable strings like `"$0.01"` or `"1,000.50"`
//! are converted at the parsing boundary via `rust_decimal`, using mantissa
//! and scale directly so no rounding drift can occur.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// An ISO-4217-shaped currency code: exactly three ASCII uppercase letters.
///
/// Serialized as its string form, e.g. `"USD"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency([u8; 3]);

impl Currency {
    /// United States dollar.
    pub const USD: Currency = Currency(*b"USD");
    /// Euro.
    pub const EUR: Currency = Currency(*b"EUR");
    /// Pound sterling.
    pub const GBP: Currency = Currency(*b"GBP");
    /// Japanese yen. Zero-exponent: the minor unit is the yen itself.
    pub const JPY: Currency = Currency(*b"JPY");

    pub fn as_str(&self) -> &str {
        // Construction guarantees ASCII uppercase.
        std::str::from_utf8(&self.0).expect("currency code is ASCII")
    }

    /// Number of minor-unit digits after the decimal point.
    ///
    /// 100 minor units per major unit for almost everything; the well-known
    /// zero- and three-exponent currencies are special-cased.
    pub fn exponent(&self) -> u32 {
        match &self.0 {
            b"JPY" | b"KRW" | b"VND" => 0,
            b"BHD" | b"KWD" | b"OMR" | b"TND" => 3,
            _ => 2,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid currency code: {0:?}")]
pub struct CurrencyError(pub String);

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_uppercase()) {
            return Err(CurrencyError(s.to_string()));
        }
        Ok(Currency([bytes[0], bytes[1], bytes[2]]))
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Currency::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A monetary amount: a non-negative integer count of minor units plus its
/// currency.
///
/// `Money::new(1000, Currency::USD)` is $10.00. Arithmetic offered by this
/// type is additive-only and checked; anything subtractive belongs to the
/// processor, not the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    minor: u64,
    currency: Currency,
}

/// Errors produced when converting human-readable input into [`Money`].
#[derive(Debug, thiserror::Error)]
pub enum MoneyError {
    #[error("Invalid number format")]
    InvalidFormat,
    #[error("Negative value is not allowed")]
    Negative,
    #[error("Amount out of range")]
    OutOfRange,
    #[error("Too big of a precision: {input} digits vs {currency} on currency")]
    WrongPrecision { input: u32, currency: u32 },
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },
}

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d\.\-]+").expect("valid regex"));

impl Money {
    pub fn new(minor: u64, currency: Currency) -> Self {
        Money { minor, currency }
    }

    /// Minor units in cents for USD convenience, the dominant fixture case.
    pub fn usd(minor: u64) -> Self {
        Money::new(minor, Currency::USD)
    }

    pub fn minor_units(&self) -> u64 {
        self.minor
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Parses a human-readable amount such as `"$0.01"`, `"1,000.50"`, or
    /// `"€20"` into minor units of `currency`.
    ///
    /// Currency symbols and grouping separators are stripped before parsing.
    /// The decimal mantissa and scale are mapped onto minor units directly,
    /// so the value never passes through a float.
    ///
    /// # Errors
    ///
    /// - [`MoneyError::InvalidFormat`] if no number remains after cleanup.
    /// - [`MoneyError::Negative`] for negative input; gateway amounts are
    ///   always non-negative.
    /// - [`MoneyError::WrongPrecision`] if the input has more fractional
    ///   digits than the currency's exponent allows.
    /// - [`MoneyError::OutOfRange`] if the value does not fit in `u64` minor
    ///   units.
    pub fn parse(input: &str, currency: Currency) -> Result<Self, MoneyError> {
        let cleaned = NON_NUMERIC.replace_all(input, "").to_string();
        let parsed = Decimal::from_str(&cleaned).map_err(|_| MoneyError::InvalidFormat)?;
        if parsed.is_sign_negative() {
            return Err(MoneyError::Negative);
        }
        let exponent = currency.exponent();
        let scale = parsed.scale();
        if scale > exponent {
            return Err(MoneyError::WrongPrecision {
                input: scale,
                currency: exponent,
            });
        }
        let mantissa = parsed.mantissa().unsigned_abs();
        let shift = 10u128.pow(exponent - scale);
        let minor = mantissa
            .checked_mul(shift)
            .ok_or(MoneyError::OutOfRange)?;
        let minor = u64::try_from(minor).map_err(|_| MoneyError::OutOfRange)?;
        Ok(Money { minor, currency })
    }

    /// Checked addition; fails on overflow or a currency mismatch.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or(MoneyError::OutOfRange)?;
        Ok(Money {
            minor,
            currency: self.currency,
        })
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exponent = self.currency.exponent();
        if exponent == 0 {
            return write!(f, "{} {}", self.minor, self.currency);
        }
        let divisor = 10u64.pow(exponent);
        let major = self.minor / divisor;
        let fraction = self.minor % divisor;
        write!(
            f,
            "{}.{:0width$} {}",
            major,
            fraction,
            self.currency,
            width = exponent as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dollar_string() {
        let money = Money::parse("$10.50", Currency::USD).unwrap();
        assert_eq!(money.minor_units(), 1050);
        assert_eq!(money.currency(), Currency::USD);
    }

    #[test]
    fn test_parse_grouped_thousands() {
        let money = Money::parse("1,000", Currency::USD).unwrap();
        assert_eq!(money.minor_units(), 100_000);
    }

    #[test]
    fn test_parse_whole_euro() {
        let money = Money::parse("€20", Currency::EUR).unwrap();
        assert_eq!(money.minor_units(), 2000);
    }

    #[test]
    fn test_parse_zero_exponent_currency() {
        let money = Money::parse("1500", Currency::JPY).unwrap();
        assert_eq!(money.minor_units(), 1500);
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(matches!(
            Money::parse("-5.00", Currency::USD),
            Err(MoneyError::Negative)
        ));
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(matches!(
            Money::parse("0.001", Currency::USD),
            Err(MoneyError::WrongPrecision { input: 3, currency: 2 })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Money::parse("abc", Currency::USD),
            Err(MoneyError::InvalidFormat)
        ));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let usd = Money::usd(100);
        let eur = Money::new(100, Currency::EUR);
        assert!(matches!(
            usd.checked_add(&eur),
            Err(MoneyError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::usd(1050).to_string(), "10.50 USD");
        assert_eq!(Money::usd(5).to_string(), "0.05 USD");
        assert_eq!(Money::new(1500, Currency::JPY).to_string(), "1500 JPY");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::USD);
        assert!(Currency::from_str("usd").is_err());
        assert!(Currency::from_str("USDD").is_err());
    }

    #[test]
    fn test_currency_serde_round_trip() {
        let json = serde_json::to_string(&Currency::GBP).unwrap();
        assert_eq!(json, "\"GBP\"");
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Currency::GBP);
    }
}
