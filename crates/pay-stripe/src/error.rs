//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors from the Stripe layer
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API call failed
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Session id did not parse as a Stripe checkout-session id
    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    /// Missing or malformed secret key
    #[error("Configuration error: {0}")]
    Config(String),

    /// STRIPE_SECRET_KEY is not set at all
    #[error("STRIPE_SECRET_KEY not set")]
    MissingKey,
}

impl PaymentError {
    /// Get user-friendly message, safe to return to the browser
    pub fn user_message(&self) -> String {
        match self {
            Self::Stripe(_) => "Payment processing failed. Please try again.".into(),
            Self::InvalidSessionId(_) => "Unknown checkout session.".into(),
            Self::Config(_) | Self::MissingKey => "Payments are not configured.".into(),
        }
    }
}
