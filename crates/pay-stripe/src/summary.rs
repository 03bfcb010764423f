//! Success-Page Session Summary
//!
//! Maps a retrieved checkout session into the display record the
//! success page and the confirmation email render from.

use std::collections::HashMap;

use chrono::DateTime;
use pay_core::CurrencyProfile;
use serde::Serialize;
use stripe::CheckoutSession;

/// Display-ready view of a completed (or pending) checkout session
#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    /// Stripe session id
    pub id: String,

    /// Total formatted with the currency symbol ("$29.99", "¥1500")
    pub amount_display: String,

    /// Uppercase currency code
    pub currency: String,

    pub customer_email: Option<String>,
    pub customer_name: Option<String>,

    /// Provider payment status ("paid", "unpaid", "no_payment_required")
    pub payment_status: String,

    /// Human-readable session creation date
    pub created_date: String,

    /// Product page recorded in the session metadata
    pub product_url: String,

    /// Referring page recorded in the session metadata
    pub referrer_url: String,
}

impl SessionSummary {
    pub(crate) fn from_session(session: &CheckoutSession) -> Self {
        let currency = session.currency.map(|c| c.to_string());
        let (email, name) = session
            .customer_details
            .as_ref()
            .map_or((None, None), |d| (d.email.clone(), d.name.clone()));

        summarize(
            session.id.to_string(),
            session.amount_total,
            currency,
            email,
            name,
            session.payment_status.to_string(),
            session.created,
            session.metadata.clone().unwrap_or_default(),
        )
    }

    /// Whether the provider reports the session as paid
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

/// Pure mapping from session fields to the display record
#[allow(clippy::too_many_arguments)]
fn summarize(
    id: String,
    amount_total: Option<i64>,
    currency: Option<String>,
    customer_email: Option<String>,
    customer_name: Option<String>,
    payment_status: String,
    created: i64,
    metadata: HashMap<String, String>,
) -> SessionSummary {
    let code = currency.unwrap_or_default();
    let minor = amount_total.unwrap_or(0);

    let amount_display = CurrencyProfile::find(&code).map_or_else(
        || minor.to_string(),
        |profile| format!("{}{}", profile.symbol, profile.format_minor_units(minor)),
    );

    let created_date = DateTime::from_timestamp(created, 0)
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_default();

    let meta = |key: &str| metadata.get(key).cloned().unwrap_or_else(|| "/".into());

    SessionSummary {
        id,
        amount_display,
        currency: code.to_uppercase(),
        customer_email,
        customer_name,
        payment_status,
        created_date,
        product_url: meta("product_url"),
        referrer_url: meta("referrer_url"),
    }
}
