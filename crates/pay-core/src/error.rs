//! Checkout Error Types

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Errors produced while validating and assembling a checkout
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Required request fields are absent or empty
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Currency code is not in the profile table or the accepted allowlist
    #[error("Unsupported currency: {code}")]
    UnsupportedCurrency {
        code: String,
        accepted: Vec<String>,
    },

    /// Price is below the currency's minimum chargeable amount
    #[error("Price must be at least {minimum} {currency}")]
    BelowMinimum {
        currency: String,
        minimum: Decimal,
    },

    /// Price carries more fractional digits than the currency supports
    #[error("{currency} supports at most {decimals} decimal places")]
    TooPrecise { currency: String, decimals: u32 },

    /// Minor-unit conversion overflowed
    #[error("Amount out of range for {currency}")]
    AmountOverflow { currency: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckoutError {
    /// Get user-friendly message, safe to return to the browser
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields(_) => "Missing required fields".into(),
            Self::UnsupportedCurrency { code, .. } => format!("Unsupported currency: {code}"),
            Self::BelowMinimum { currency, minimum } => {
                format!("Price must be at least {minimum} {}", currency.to_uppercase())
            }
            Self::TooPrecise { currency, decimals } => format!(
                "{} supports at most {decimals} decimal places",
                currency.to_uppercase()
            ),
            Self::AmountOverflow { .. } => "Price is out of range".into(),
            Self::Config(_) => "Service configuration error".into(),
        }
    }
}
