//! # pay-stripe
//!
//! Stripe binding for the buy-button service, using the hosted-checkout
//! flow: the server creates a session and redirects the customer to
//! Stripe's payment page; Stripe redirects back to the success or cancel
//! URL when the flow ends.
//!
//! ```rust,ignore
//! use pay_core::{CheckoutOptions, CheckoutRequest, RequestContext, SessionSpec};
//! use pay_stripe::StripeClient;
//!
//! let client = StripeClient::from_env()?;
//! let spec = SessionSpec::build(&request, &ctx, &options)?;
//! let session = client.create_session(&spec).await?;
//! // Redirect the browser to: session.url
//! ```

mod client;
mod error;
mod summary;

pub use client::{CreatedSession, StripeClient};
pub use error::{PaymentError, Result};
pub use summary::SessionSummary;
