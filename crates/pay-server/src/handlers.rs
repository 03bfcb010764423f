//! HTTP Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
};
use maud::Markup;
use serde::{Deserialize, Serialize};

use pay_core::{CheckoutError, CheckoutRequest, RequestContext, SessionSpec, Url};

use crate::button::{ButtonOptions, buy_button, missing_params_error};
use crate::pages;
use crate::state::AppState;

/// Required fields echoed back on validation failure
const REQUIRED_FIELDS: [&str; 3] = ["productId", "price", "name"];

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
    pub email_configured: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Hosted checkout URL to redirect the browser to
    pub url: String,
    pub session_id: String,
}

/// Structured error payload; never a stack trace
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<&'static str>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_currencies: Option<Vec<String>>,
}

impl ErrorResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            required: None,
            accepted_currencies: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonQuery {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub disabled: Option<bool>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.stripe.is_some(),
        email_configured: state.notifier.is_some(),
    })
}

/// Create a Stripe checkout session for a single product
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let stripe = state.stripe.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("Payments are not configured")),
        )
    })?;

    let ctx = request_context(&state, &headers)?;

    let spec = SessionSpec::build(&payload, &ctx, &state.config.checkout)
        .map_err(validation_error_response)?;

    let session = stripe.create_session(&spec).await.map_err(|e| {
        tracing::error!("Stripe error details: {e}");
        (StatusCode::BAD_GATEWAY, Json(ErrorResponse::new(e.user_message())))
    })?;

    Ok(Json(CheckoutResponse { url: session.url, session_id: session.id }))
}

/// Success page: retrieve the session and render the order summary.
/// Provider lookup failures degrade to an error banner, never a 500.
pub async fn success_page(
    State(state): State<AppState>,
    Query(query): Query<SuccessQuery>,
) -> Markup {
    let Some(session_id) = query.session_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    else {
        return pages::success(None, false);
    };

    let Some(stripe) = state.stripe.as_ref() else {
        tracing::warn!("success page hit with session_id but payments are not configured");
        return pages::success(None, true);
    };

    match stripe.retrieve_summary(session_id).await {
        Ok(summary) => {
            tracing::info!(
                "Payment successful: {} - {} {}",
                summary.id,
                summary.amount_display,
                summary.currency
            );

            if summary.is_paid() {
                if let Some(notifier) = state.notifier.as_ref() {
                    let notifier = notifier.clone();
                    let receipt = summary.clone();
                    tokio::spawn(async move { notifier.send_receipt(&receipt).await });
                }
            }

            pages::success(Some(&summary), false)
        }
        Err(e) => {
            tracing::error!("Error retrieving Stripe session: {e}");
            pages::success(None, true)
        }
    }
}

/// Cancel page
pub async fn cancel_page() -> Markup {
    pages::cancel()
}

/// Render the buy-now button fragment for server-side inclusion
pub async fn button_fragment(Query(query): Query<ButtonQuery>) -> Markup {
    let (Some(product_id), Some(price), Some(name)) = (
        query.product_id.filter(|s| !s.trim().is_empty()),
        query.price.filter(|s| !s.trim().is_empty()),
        query.name.filter(|s| !s.trim().is_empty()),
    ) else {
        return missing_params_error();
    };

    buy_button(&ButtonOptions {
        product_id,
        price,
        name,
        image: query.image.filter(|s| !s.trim().is_empty()),
        currency: query.currency.filter(|s| !s.trim().is_empty()),
        button_text: query.button_text.unwrap_or_else(|| "Buy Now".into()),
        css_class: query.class,
        style: query.style,
        disabled: query.disabled.unwrap_or(false),
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn request_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<RequestContext, (StatusCode, Json<ErrorResponse>)> {
    let base_url = state
        .config
        .public_base_url
        .clone()
        .or_else(|| base_url_from_headers(headers))
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Unable to determine request base URL")),
            )
        })?;

    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    Ok(RequestContext::new(base_url, referer))
}

fn base_url_from_headers(headers: &HeaderMap) -> Option<Url> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");

    Url::parse(&format!("{proto}://{host}")).ok()
}

fn validation_error_response(err: CheckoutError) -> (StatusCode, Json<ErrorResponse>) {
    let mut response = ErrorResponse::new(err.user_message());

    match &err {
        CheckoutError::MissingFields(_) => {
            response.required = Some(REQUIRED_FIELDS.to_vec());
        }
        CheckoutError::UnsupportedCurrency { accepted, .. } => {
            response.accepted_currencies = Some(accepted.clone());
        }
        _ => {}
    }

    (StatusCode::BAD_REQUEST, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_payload_lists_required() {
        let (status, Json(body)) =
            validation_error_response(CheckoutError::MissingFields(vec!["price"]));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "error");
        assert_eq!(body.required, Some(vec!["productId", "price", "name"]));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["required"][0], "productId");
        assert!(json.get("acceptedCurrencies").is_none());
    }

    #[test]
    fn test_unsupported_currency_payload_names_accepted_list() {
        let (_, Json(body)) = validation_error_response(CheckoutError::UnsupportedCurrency {
            code: "xyz".into(),
            accepted: vec!["usd".into()],
        });
        assert_eq!(body.accepted_currencies, Some(vec!["usd".to_string()]));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["acceptedCurrencies"][0], "usd");
    }

    #[test]
    fn test_base_url_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "shop.example.com".parse().unwrap());
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        let url = base_url_from_headers(&headers).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/");

        let mut plain = HeaderMap::new();
        plain.insert(header::HOST, "localhost:3000".parse().unwrap());
        let url = base_url_from_headers(&plain).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/");
    }
}
