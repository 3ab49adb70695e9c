//! Ledger token amounts.
//!
//! The ledger accounts in the smallest indivisible unit (18 decimals below
//! one whole token). Configuration uses human-readable decimal strings such
//! as `"0.2"`; the wire format is the integer amount as a decimal string.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Number of decimal places in one whole token.
pub const TOKEN_DECIMALS: u32 = 18;

const UNITS_PER_TOKEN: u128 = 10u128.pow(TOKEN_DECIMALS);

/// An amount of ledger tokens, stored in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    pub fn base_units(&self) -> u128 {
        self.0
    }

    /// Parse a decimal token string (`"0.05"`, `"1"`, `"12.5"`) into base units.
    pub fn parse_tokens(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("amount must not be empty".to_string());
        }

        let (whole, fraction) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(format!("invalid amount: '{trimmed}'"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid amount: '{trimmed}'"));
        }
        if fraction.len() > TOKEN_DECIMALS as usize {
            return Err(format!(
                "amount '{trimmed}' has more than {TOKEN_DECIMALS} decimal places"
            ));
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .map_err(|e| format!("invalid amount '{trimmed}': {e}"))?
        };

        let mut fraction_digits = fraction.to_string();
        while fraction_digits.len() < TOKEN_DECIMALS as usize {
            fraction_digits.push('0');
        }
        let fraction_units = fraction_digits
            .parse::<u128>()
            .map_err(|e| format!("invalid amount '{trimmed}': {e}"))?;

        whole_units
            .checked_mul(UNITS_PER_TOKEN)
            .and_then(|w| w.checked_add(fraction_units))
            .map(TokenAmount)
            .ok_or_else(|| format!("amount '{trimmed}' is too large"))
    }
}

impl fmt::Display for TokenAmount {
    /// Formats as whole tokens with trailing zeros trimmed (`0.05`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let fraction = self.0 % UNITS_PER_TOKEN;
        if fraction == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{fraction:0width$}", width = TOKEN_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for TokenAmount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TokenAmount::parse_tokens(s)
    }
}

// Wire format: base units as a decimal string (u128 does not fit a JSON number).
impl Serialize for TokenAmount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u128>()
            .map(TokenAmount)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fractional_tokens() {
        let amount = TokenAmount::parse_tokens("0.05").unwrap();
        assert_eq!(amount.base_units(), 50_000_000_000_000_000);
    }

    #[test]
    fn test_parse_whole_and_leading_dot() {
        assert_eq!(
            TokenAmount::parse_tokens("2").unwrap().base_units(),
            2 * UNITS_PER_TOKEN
        );
        assert_eq!(
            TokenAmount::parse_tokens(".2").unwrap().base_units(),
            200_000_000_000_000_000
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TokenAmount::parse_tokens("").is_err());
        assert!(TokenAmount::parse_tokens(".").is_err());
        assert!(TokenAmount::parse_tokens("-1").is_err());
        assert!(TokenAmount::parse_tokens("1.2.3").is_err());
        assert!(TokenAmount::parse_tokens("0.0000000000000000001").is_err());
    }

    #[test]
    fn test_display_trims_trailing_zeros() {
        assert_eq!(TokenAmount::parse_tokens("0.050").unwrap().to_string(), "0.05");
        assert_eq!(TokenAmount::parse_tokens("3").unwrap().to_string(), "3");
    }

    #[test]
    fn test_wire_format_is_base_unit_string() {
        let amount = TokenAmount::parse_tokens("0.2").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"200000000000000000\"");
        let back: TokenAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
