//! Server Configuration
//!
//! Everything comes from environment variables (plus `.env` via dotenvy),
//! mirroring the deployment surface of the checkout module this service
//! replaces: default currency, accepted-currency allowlist, redirect
//! paths, session feature toggles, and optional SMTP settings.

use std::collections::HashMap;

use anyhow::{Context, bail};
use pay_core::{CheckoutOptions, Url};

/// Outbound email settings; present only when `SMTP_HOST` is set
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: String,
}

/// Full server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,

    /// Absolute base URL override; when unset the base URL is derived
    /// from the Host / X-Forwarded-Proto headers per request
    pub public_base_url: Option<Url>,

    /// Checkout behavior (currency, redirects, session toggles)
    pub checkout: CheckoutOptions,

    /// SMTP settings for order-confirmation emails
    pub smtp: Option<SmtpConfig>,
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = CheckoutOptions::default();

        let default_currency = env_or("DEFAULT_CURRENCY", &defaults.default_currency).to_lowercase();
        let accepted_currencies = std::env::var("ACCEPTED_CURRENCIES")
            .ok()
            .map_or_else(|| vec![default_currency.clone()], |raw| parse_list(&raw));

        let success_path = env_or("SUCCESS_PATH", &defaults.success_path);
        let cancel_path = env_or("CANCEL_PATH", &defaults.cancel_path);
        validate_redirect_paths(&success_path, &cancel_path)?;

        let shipping_countries = std::env::var("SHIPPING_COUNTRIES")
            .ok()
            .map_or_else(|| defaults.shipping_countries.clone(), |raw| parse_list(&raw));

        let metadata: HashMap<String, String> = match std::env::var("SESSION_METADATA") {
            Ok(raw) => serde_json::from_str(&raw)
                .context("SESSION_METADATA must be a JSON object of strings")?,
            Err(_) => HashMap::new(),
        };

        let checkout = CheckoutOptions {
            default_currency,
            accepted_currencies,
            success_path,
            cancel_path,
            collect_shipping: env_bool("COLLECT_SHIPPING"),
            collect_phone: env_bool("COLLECT_PHONE"),
            allow_promotion_codes: env_bool("ALLOW_PROMOTION_CODES"),
            shipping_countries,
            metadata,
        };

        let public_base_url = match std::env::var("PUBLIC_BASE_URL") {
            Ok(raw) => Some(Url::parse(&raw).context("PUBLIC_BASE_URL must be an absolute URL")?),
            Err(_) => None,
        };

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:3000"),
            public_base_url,
            checkout,
            smtp: smtp_from_env()?,
        })
    }
}

fn smtp_from_env() -> anyhow::Result<Option<SmtpConfig>> {
    let Ok(host) = std::env::var("SMTP_HOST") else {
        return Ok(None);
    };

    let from = std::env::var("NOTIFY_FROM").context("SMTP_HOST is set but NOTIFY_FROM is not")?;
    let to = std::env::var("NOTIFY_TO").context("SMTP_HOST is set but NOTIFY_TO is not")?;

    let port = match std::env::var("SMTP_PORT") {
        Ok(raw) => Some(raw.parse::<u16>().context("SMTP_PORT must be a port number")?),
        Err(_) => None,
    };

    Ok(Some(SmtpConfig {
        host,
        port,
        username: std::env::var("SMTP_USERNAME").ok(),
        password: std::env::var("SMTP_PASSWORD").ok(),
        from,
        to,
    }))
}

// Both paths become axum routes, and the router panics on duplicates.
fn validate_redirect_paths(success_path: &str, cancel_path: &str) -> anyhow::Result<()> {
    for path in [success_path, cancel_path] {
        if !path.starts_with('/') {
            bail!("Redirect path must start with '/': {path}");
        }
    }
    if success_path == cancel_path {
        bail!("SUCCESS_PATH and CANCEL_PATH must differ, both are {success_path}");
    }
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str) -> bool {
    std::env::var(key).as_deref().map(parse_bool).unwrap_or(false)
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" 1 "));
        assert!(parse_bool("Yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("maybe"));
    }

    #[test]
    fn test_redirect_paths_must_be_rooted_and_distinct() {
        assert!(validate_redirect_paths("/checkout/success", "/checkout/cancel").is_ok());
        assert!(validate_redirect_paths("success", "/checkout/cancel").is_err());
        assert!(validate_redirect_paths("/checkout/success", "cancel").is_err());

        let err = validate_redirect_paths("/checkout/done", "/checkout/done").unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("usd, EUR ,jpy"), vec!["usd", "eur", "jpy"]);
        assert_eq!(parse_list(" , "), Vec::<String>::new());
    }
}
