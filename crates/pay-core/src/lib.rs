//! # pay-core
//!
//! Provider-neutral checkout domain logic for the buy-button service:
//!
//! - Static currency profiles (decimal precision, minimum amounts,
//!   display formatting) with minor-unit normalization.
//! - Checkout request validation and session-spec assembly, including
//!   image-URL sanitizing and redirect-URL construction.
//!
//! Everything here is pure; the Stripe binding lives in `pay-stripe`.

pub mod checkout;
pub mod currency;
pub mod error;

pub use checkout::{
    CheckoutOptions, CheckoutRequest, RequestContext, SESSION_ID_PLACEHOLDER, SessionSpec,
    sanitize_image_url,
};
pub use currency::{CURRENCY_PROFILES, CurrencyProfile};
pub use error::{CheckoutError, Result};

pub use rust_decimal::Decimal;
pub use url::Url;
