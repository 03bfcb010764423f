//! Currency Profiles
//!
//! Static metadata for every currency the checkout accepts: decimal
//! precision, minimum chargeable amount, and display formatting.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::CheckoutError;

/// Static profile describing how a currency is charged and displayed
#[derive(Clone, Copy, Debug)]
pub struct CurrencyProfile {
    /// Lowercase ISO 4217 code (e.g., "usd")
    pub code: &'static str,

    /// Number of decimal places in the major unit (0 for jpy/krw, 3 for kwd)
    pub decimals: u32,

    /// Minimum chargeable amount, in major units (always one minor unit)
    pub minimum: Decimal,

    /// Display symbol (e.g., "$")
    pub symbol: &'static str,

    /// Human-readable name
    pub label: &'static str,
}

/// Every currency this service knows how to charge
pub static CURRENCY_PROFILES: &[CurrencyProfile] = &[
    CurrencyProfile { code: "usd", decimals: 2, minimum: dec!(0.01), symbol: "$", label: "US Dollar" },
    CurrencyProfile { code: "eur", decimals: 2, minimum: dec!(0.01), symbol: "\u{20ac}", label: "Euro" },
    CurrencyProfile { code: "gbp", decimals: 2, minimum: dec!(0.01), symbol: "\u{a3}", label: "British Pound" },
    CurrencyProfile { code: "jpy", decimals: 0, minimum: dec!(1), symbol: "\u{a5}", label: "Japanese Yen" },
    CurrencyProfile { code: "cad", decimals: 2, minimum: dec!(0.01), symbol: "C$", label: "Canadian Dollar" },
    CurrencyProfile { code: "aud", decimals: 2, minimum: dec!(0.01), symbol: "A$", label: "Australian Dollar" },
    CurrencyProfile { code: "krw", decimals: 0, minimum: dec!(1), symbol: "\u{20a9}", label: "South Korean Won" },
    CurrencyProfile { code: "kwd", decimals: 3, minimum: dec!(0.001), symbol: "KD", label: "Kuwaiti Dinar" },
    CurrencyProfile { code: "chf", decimals: 2, minimum: dec!(0.01), symbol: "CHF", label: "Swiss Franc" },
    CurrencyProfile { code: "cny", decimals: 2, minimum: dec!(0.01), symbol: "\u{a5}", label: "Chinese Yuan" },
];

impl CurrencyProfile {
    /// Look up a profile by code (case-insensitive)
    pub fn find(code: &str) -> Option<&'static Self> {
        CURRENCY_PROFILES
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
    }

    /// Convert a decimal price in major units to the currency's minor-unit
    /// integer (e.g., 29.99 usd -> 2999, 1500 jpy -> 1500).
    ///
    /// Rounds half away from zero so a midpoint never undercharges.
    pub fn minor_units(&self, price: Decimal) -> Result<i64, CheckoutError> {
        let scale = Decimal::from(10i64.pow(self.decimals));
        let scaled = price
            .checked_mul(scale)
            .ok_or_else(|| CheckoutError::AmountOverflow { currency: self.code.to_string() })?;

        scaled
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| CheckoutError::AmountOverflow { currency: self.code.to_string() })
    }

    /// Check a price against the currency's minimum and decimal precision
    pub fn validate_price(&self, price: Decimal) -> Result<(), CheckoutError> {
        if price < self.minimum {
            return Err(CheckoutError::BelowMinimum {
                currency: self.code.to_string(),
                minimum: self.minimum,
            });
        }

        if price.normalize().scale() > self.decimals {
            return Err(CheckoutError::TooPrecise {
                currency: self.code.to_string(),
                decimals: self.decimals,
            });
        }

        Ok(())
    }

    /// Format a major-unit price for display ("29.99", "1500", "1.250")
    pub fn format_price(&self, price: Decimal) -> String {
        let rounded =
            price.round_dp_with_strategy(self.decimals, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.prec$}", prec = self.decimals as usize)
    }

    /// Format a minor-unit total back into major units for display
    pub fn format_minor_units(&self, minor: i64) -> String {
        let major = Decimal::new(minor, self.decimals);
        format!("{major:.prec$}", prec = self.decimals as usize)
    }
}
