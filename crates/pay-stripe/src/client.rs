//! Stripe Checkout Integration
//!
//! Implements the "Stripe Checkout (Hosted)" approach: the server builds
//! a session from a [`SessionSpec`] and redirects the customer to
//! Stripe's hosted payment page.

use std::str::FromStr;

use pay_core::SessionSpec;
use serde::Serialize;
use stripe::{
    CheckoutSession, CheckoutSessionId, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionLineItemsPriceData,
    CreateCheckoutSessionLineItemsPriceDataProductData, CreateCheckoutSessionPaymentMethodTypes,
    CreateCheckoutSessionPhoneNumberCollection, CreateCheckoutSessionShippingAddressCollection,
    CreateCheckoutSessionShippingAddressCollectionAllowedCountries, Currency,
};

use crate::error::{PaymentError, Result};
use crate::summary::SessionSummary;

/// Secret keys issued by Stripe always carry this prefix
const SECRET_KEY_PREFIX: &str = "sk_";

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
}

impl StripeClient {
    /// Create a new Stripe client, validating the key format.
    ///
    /// A key without the `sk_` prefix can never authenticate, so refuse
    /// to construct at all rather than fail on the first charge.
    pub fn new(secret_key: &str) -> Result<Self> {
        if !secret_key.starts_with(SECRET_KEY_PREFIX) {
            return Err(PaymentError::Config(
                "Invalid Stripe secret key format. Key must start with \"sk_\"".into(),
            ));
        }

        Ok(Self { client: Client::new(secret_key) })
    }

    /// Create from the `STRIPE_SECRET_KEY` environment variable.
    ///
    /// An unset variable yields [`PaymentError::MissingKey`] so callers
    /// can run with payments disabled instead of aborting.
    pub fn from_env() -> Result<Self> {
        let secret_key =
            std::env::var("STRIPE_SECRET_KEY").map_err(|_| PaymentError::MissingKey)?;
        Self::new(&secret_key)
    }

    /// Create a hosted checkout session from an assembled spec.
    ///
    /// Returns the session id and the URL to redirect the customer to.
    pub async fn create_session(&self, spec: &SessionSpec) -> Result<CreatedSession> {
        let currency = Currency::from_str(&spec.currency).map_err(|_| {
            PaymentError::Config(format!("Currency not recognized by Stripe: {}", spec.currency))
        })?;

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.success_url = Some(&spec.success_url);
        params.cancel_url = Some(&spec.cancel_url);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.metadata = Some(spec.metadata.clone());

        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency,
                unit_amount: Some(spec.unit_amount),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: spec.product_name.clone(),
                    images: if spec.images.is_empty() { None } else { Some(spec.images.clone()) },
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        if spec.collect_shipping {
            let countries: Vec<_> =
                spec.shipping_countries.iter().filter_map(|c| allowed_country(c)).collect();
            if countries.is_empty() {
                tracing::warn!("no recognized shipping countries; shipping collection skipped");
            } else {
                params.shipping_address_collection =
                    Some(CreateCheckoutSessionShippingAddressCollection {
                        allowed_countries: countries,
                    });
            }
        }

        if spec.collect_phone {
            params.phone_number_collection =
                Some(CreateCheckoutSessionPhoneNumberCollection { enabled: true });
        }

        if spec.allow_promotion_codes {
            params.allow_promotion_codes = Some(true);
        }

        let session = CheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::Stripe("No checkout URL returned".into()))?;

        tracing::info!(session_id = %session.id, "created checkout session");

        Ok(CreatedSession { id: session.id.to_string(), url })
    }

    /// Fetch a session and map it into a display-ready summary
    pub async fn retrieve_summary(&self, session_id: &str) -> Result<SessionSummary> {
        let id = CheckoutSessionId::from_str(session_id)
            .map_err(|_| PaymentError::InvalidSessionId(session_id.to_string()))?;

        let session = CheckoutSession::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        Ok(SessionSummary::from_session(&session))
    }
}

/// Result of creating a checkout session
#[derive(Clone, Debug, Serialize)]
pub struct CreatedSession {
    /// Stripe session id
    pub id: String,

    /// Hosted checkout URL to redirect the customer to
    pub url: String,
}

fn allowed_country(
    code: &str,
) -> Option<CreateCheckoutSessionShippingAddressCollectionAllowedCountries> {
    use CreateCheckoutSessionShippingAddressCollectionAllowedCountries as Country;

    match code.to_ascii_uppercase().as_str() {
        "US" => Some(Country::Us),
        "CA" => Some(Country::Ca),
        "GB" => Some(Country::Gb),
        "AU" => Some(Country::Au),
        "NZ" => Some(Country::Nz),
        "DE" => Some(Country::De),
        "FR" => Some(Country::Fr),
        "JP" => Some(Country::Jp),
        "CH" => Some(Country::Ch),
        "KR" => Some(Country::Kr),
        other => {
            tracing::warn!(country = other, "unrecognized shipping country ignored");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefix_is_enforced() {
        assert!(StripeClient::new("pk_test_123").is_err());
        assert!(StripeClient::new("sk_test_123").is_ok());
    }

    #[test]
    fn test_country_mapping() {
        assert!(allowed_country("us").is_some());
        assert!(allowed_country("GB").is_some());
        assert!(allowed_country("ZZ").is_none());
    }
}
