//! Money amounts as exact decimals paired with a currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in a specific currency.
///
/// Amounts are kept in the currency's standard unit (e.g., dollars, not
/// cents) as a [`Decimal`] so arithmetic never loses precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// Which currency `amount` is denominated in.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Pair an amount with its currency.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// Extend this unit price across a line quantity.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency_code.as_str())
    }
}

/// The currencies the store quotes prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The three-letter ISO 4217 code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(format!("unsupported currency code: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_multiplies_amount() {
        let unit = Price::new(Decimal::new(1450, 2), CurrencyCode::USD);
        let total = unit.line_total(3);
        assert_eq!(total.amount, Decimal::new(4350, 2));
        assert_eq!(total.currency_code, CurrencyCode::USD);
    }

    #[test]
    fn test_zero() {
        let zero = Price::zero(CurrencyCode::EUR);
        assert_eq!(zero.amount, Decimal::ZERO);
    }

    #[test]
    fn test_display_two_decimal_places() {
        let price = Price::new(Decimal::new(95, 1), CurrencyCode::USD);
        assert_eq!(price.to_string(), "9.50 USD");
    }

    #[test]
    fn test_currency_code_from_str() {
        assert_eq!("GBP".parse::<CurrencyCode>().unwrap(), CurrencyCode::GBP);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
