//! Checkout Request Validation and Session Assembly
//!
//! Pure mapping from an inbound buy-button payload plus request context
//! to a provider-neutral session spec. No network calls happen here, so
//! every rejection path is testable without a Stripe account.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::currency::{CURRENCY_PROFILES, CurrencyProfile};
use crate::error::{CheckoutError, Result};

/// Literal placeholder Stripe substitutes with the real session id
/// when redirecting back to the success URL.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Inbound checkout payload, as POSTed by the buy-button script.
///
/// Every field is optional at the serde layer so that a missing field
/// surfaces as a structured validation error rather than a decode failure.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub product_id: Option<String>,

    /// Decimal price in major units (29.99 means $29.99 for usd)
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    /// Currency code; falls back to the configured default
    #[serde(default)]
    pub currency: Option<String>,
}

impl CheckoutRequest {
    /// Names of required fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.product_id.as_deref().is_none_or(|s| s.trim().is_empty()) {
            missing.push("productId");
        }
        if self.price.is_none() {
            missing.push("price");
        }
        if self.name.as_deref().is_none_or(|s| s.trim().is_empty()) {
            missing.push("name");
        }
        missing
    }
}

/// Per-request context the session spec depends on
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Absolute base URL of this deployment (scheme + host)
    pub base_url: Url,

    /// Referring page, if the browser sent one
    pub referer: Option<String>,
}

impl RequestContext {
    pub fn new(base_url: Url, referer: Option<String>) -> Self {
        Self { base_url, referer }
    }
}

/// Site-level checkout configuration
#[derive(Clone, Debug)]
pub struct CheckoutOptions {
    /// Currency used when the request does not name one
    pub default_currency: String,

    /// Allowlist of currency codes; empty means every known profile
    pub accepted_currencies: Vec<String>,

    /// Path the customer lands on after paying
    pub success_path: String,

    /// Path the customer lands on after cancelling
    pub cancel_path: String,

    /// Ask Stripe to collect a shipping address
    pub collect_shipping: bool,

    /// Ask Stripe to collect a phone number
    pub collect_phone: bool,

    /// Allow promotion codes on the hosted page
    pub allow_promotion_codes: bool,

    /// Countries shipping may be collected for
    pub shipping_countries: Vec<String>,

    /// Extra metadata attached to every session
    pub metadata: HashMap<String, String>,
}

impl Default for CheckoutOptions {
    fn default() -> Self {
        Self {
            default_currency: "usd".into(),
            accepted_currencies: vec!["usd".into()],
            success_path: "/checkout/success".into(),
            cancel_path: "/checkout/cancel".into(),
            collect_shipping: false,
            collect_phone: false,
            allow_promotion_codes: false,
            shipping_countries: vec!["US".into(), "CA".into(), "GB".into(), "AU".into()],
            metadata: HashMap::new(),
        }
    }
}

/// Provider-neutral checkout session payload: one line item at the
/// normalized minor-unit amount, redirect URLs, and a metadata bag for
/// later reconciliation.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSpec {
    pub product_id: String,
    pub product_name: String,

    /// Lowercase currency code
    pub currency: String,

    /// Amount in the currency's minor unit
    pub unit_amount: i64,

    /// Sanitized absolute image URLs (at most one)
    pub images: Vec<String>,

    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,

    pub collect_shipping: bool,
    pub collect_phone: bool,
    pub allow_promotion_codes: bool,
    pub shipping_countries: Vec<String>,
}

impl SessionSpec {
    /// Validate the request and assemble the session payload.
    ///
    /// Returns a field-level error for missing fields, an unsupported or
    /// disallowed currency, or a price below the currency minimum. None
    /// of these paths touch the payment provider.
    pub fn build(
        request: &CheckoutRequest,
        ctx: &RequestContext,
        options: &CheckoutOptions,
    ) -> Result<Self> {
        let missing = request.missing_fields();
        let (Some(product_id), Some(price), Some(name)) = (
            request.product_id.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            request.price,
            request.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) else {
            return Err(CheckoutError::MissingFields(missing));
        };

        let code = request
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(options.default_currency.as_str())
            .to_lowercase();

        let accepted: Vec<String> = if options.accepted_currencies.is_empty() {
            CURRENCY_PROFILES.iter().map(|p| p.code.to_string()).collect()
        } else {
            options.accepted_currencies.iter().map(|c| c.to_lowercase()).collect()
        };

        if !accepted.contains(&code) {
            return Err(CheckoutError::UnsupportedCurrency { code, accepted });
        }

        let profile = CurrencyProfile::find(&code).ok_or_else(|| {
            CheckoutError::UnsupportedCurrency { code: code.clone(), accepted: accepted.clone() }
        })?;

        profile.validate_price(price)?;
        let unit_amount = profile.minor_units(price)?;

        let images = request
            .image
            .as_deref()
            .and_then(|raw| sanitize_image_url(raw, &ctx.base_url))
            .map(String::from)
            .into_iter()
            .collect();

        let success = ctx
            .base_url
            .join(&options.success_path)
            .map_err(|e| CheckoutError::Config(format!("Bad success path: {e}")))?;
        let cancel = ctx
            .base_url
            .join(&options.cancel_path)
            .map_err(|e| CheckoutError::Config(format!("Bad cancel path: {e}")))?;

        let mut metadata = options.metadata.clone();
        metadata.insert(
            "product_url".into(),
            ctx.referer.clone().unwrap_or_else(|| ctx.base_url.to_string()),
        );
        metadata.insert("product_id".into(), product_id.to_string());
        metadata.insert("original_currency".into(), code.clone());
        metadata.insert("original_price".into(), profile.format_price(price));

        Ok(Self {
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            currency: code,
            unit_amount,
            images,
            success_url: format!("{success}?session_id={SESSION_ID_PLACEHOLDER}"),
            cancel_url: cancel.to_string(),
            metadata,
            collect_shipping: options.collect_shipping,
            collect_phone: options.collect_phone,
            allow_promotion_codes: options.allow_promotion_codes,
            shipping_countries: options.shipping_countries.clone(),
        })
    }
}

/// Resolve and filter an image URL for the provider.
///
/// Relative paths are resolved against the request's base URL. Only
/// absolute http(s) URLs survive, and loopback hosts are dropped because
/// the provider cannot fetch them.
pub fn sanitize_image_url(raw: &str, base: &Url) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let resolved = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(trimmed).ok()?,
        Err(_) => return None,
    };

    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }

    let local = match resolved.host()? {
        Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => ip.is_loopback(),
        Host::Ipv6(ip) => ip.is_loopback(),
    };

    if local { None } else { Some(resolved) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ctx() -> RequestContext {
        RequestContext::new(Url::parse("https://shop.example.com").unwrap(), None)
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            product_id: Some("prod_42".into()),
            price: Some(dec!(29.99)),
            name: Some("Art Print".into()),
            image: None,
            currency: None,
        }
    }

    #[test]
    fn test_builds_single_line_item_spec() {
        let spec = SessionSpec::build(&request(), &ctx(), &CheckoutOptions::default()).unwrap();
        assert_eq!(spec.unit_amount, 2999);
        assert_eq!(spec.currency, "usd");
        assert_eq!(spec.product_name, "Art Print");
        assert_eq!(
            spec.success_url,
            "https://shop.example.com/checkout/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(spec.cancel_url, "https://shop.example.com/checkout/cancel");
    }

    #[test]
    fn test_missing_price_lists_required_fields() {
        let mut req = request();
        req.price = None;
        let err = SessionSpec::build(&req, &ctx(), &CheckoutOptions::default()).unwrap_err();
        match err {
            CheckoutError::MissingFields(fields) => assert_eq!(fields, vec!["price"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let req = CheckoutRequest {
            product_id: Some("  ".into()),
            name: None,
            ..request()
        };
        let err = SessionSpec::build(&req, &ctx(), &CheckoutOptions::default()).unwrap_err();
        match err {
            CheckoutError::MissingFields(fields) => {
                assert_eq!(fields, vec!["productId", "name"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_currency_names_accepted_list() {
        let mut req = request();
        req.currency = Some("xyz".into());
        let options = CheckoutOptions {
            accepted_currencies: vec!["usd".into(), "eur".into()],
            ..CheckoutOptions::default()
        };
        let err = SessionSpec::build(&req, &ctx(), &options).unwrap_err();
        match err {
            CheckoutError::UnsupportedCurrency { code, accepted } => {
                assert_eq!(code, "xyz");
                assert_eq!(accepted, vec!["usd".to_string(), "eur".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_currency_outside_allowlist_is_rejected() {
        // jpy exists in the profile table but is not accepted here
        let mut req = request();
        req.currency = Some("jpy".into());
        req.price = Some(dec!(1500));
        let err = SessionSpec::build(&req, &ctx(), &CheckoutOptions::default()).unwrap_err();
        assert!(matches!(err, CheckoutError::UnsupportedCurrency { .. }));
    }

    #[test]
    fn test_zero_decimal_currency_amount() {
        let mut req = request();
        req.currency = Some("jpy".into());
        req.price = Some(dec!(1500));
        let options = CheckoutOptions {
            accepted_currencies: vec!["usd".into(), "jpy".into()],
            ..CheckoutOptions::default()
        };
        let spec = SessionSpec::build(&req, &ctx(), &options).unwrap();
        assert_eq!(spec.unit_amount, 1500);
    }

    #[test]
    fn test_metadata_carries_reconciliation_fields() {
        let context = RequestContext::new(
            Url::parse("https://shop.example.com").unwrap(),
            Some("https://shop.example.com/products/print".into()),
        );
        let spec = SessionSpec::build(&request(), &context, &CheckoutOptions::default()).unwrap();
        assert_eq!(
            spec.metadata.get("product_url").map(String::as_str),
            Some("https://shop.example.com/products/print")
        );
        assert_eq!(spec.metadata.get("product_id").map(String::as_str), Some("prod_42"));
        assert_eq!(spec.metadata.get("original_currency").map(String::as_str), Some("usd"));
        assert_eq!(spec.metadata.get("original_price").map(String::as_str), Some("29.99"));
    }

    #[test]
    fn test_absolute_https_image_is_preserved() {
        let mut req = request();
        req.image = Some("https://cdn.example.com/print.jpg".into());
        let spec = SessionSpec::build(&req, &ctx(), &CheckoutOptions::default()).unwrap();
        assert_eq!(spec.images, vec!["https://cdn.example.com/print.jpg".to_string()]);
    }

    #[test]
    fn test_relative_image_resolves_against_base() {
        let mut req = request();
        req.image = Some("/uploads/print.jpg".into());
        let spec = SessionSpec::build(&req, &ctx(), &CheckoutOptions::default()).unwrap();
        assert_eq!(
            spec.images,
            vec!["https://shop.example.com/uploads/print.jpg".to_string()]
        );
    }

    #[test]
    fn test_loopback_image_is_dropped() {
        for bad in ["http://localhost:3000/a.jpg", "http://127.0.0.1/a.jpg", "http://[::1]/a.jpg"] {
            let mut req = request();
            req.image = Some(bad.into());
            let spec = SessionSpec::build(&req, &ctx(), &CheckoutOptions::default()).unwrap();
            assert!(spec.images.is_empty(), "{bad} should have been filtered");
        }
    }

    #[test]
    fn test_non_http_image_is_dropped() {
        let base = Url::parse("https://shop.example.com").unwrap();
        assert!(sanitize_image_url("ftp://cdn.example.com/a.jpg", &base).is_none());
        assert!(sanitize_image_url("javascript:alert(1)", &base).is_none());
        assert!(sanitize_image_url("   ", &base).is_none());
    }
}
