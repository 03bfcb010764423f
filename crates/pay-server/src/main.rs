//! Buy-Button Checkout Server
//!
//! Axum-based server exposing a Stripe hosted-checkout flow: a checkout
//! endpoint the buy-now button POSTs to, success/cancel pages Stripe
//! redirects back to, and a server-rendered button fragment.

mod button;
mod config;
mod handlers;
mod notify;
mod pages;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pay_stripe::{PaymentError, StripeClient};

use crate::config::ServerConfig;
use crate::handlers::{button_fragment, cancel_page, create_checkout, health_check, success_page};
use crate::notify::Notifier;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;

    // A missing secret key only disables payments; a malformed one is fatal
    let stripe = match StripeClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(client))
        }
        Err(PaymentError::MissingKey) => {
            tracing::warn!("⚠ Stripe secret key not found - payments disabled");
            tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let notifier = match config.smtp.as_ref() {
        Some(smtp) => {
            let notifier = Notifier::new(smtp)?;
            tracing::info!("✓ Order emails configured ({})", smtp.host);
            Some(Arc::new(notifier))
        }
        None => {
            tracing::info!("Order emails disabled - set SMTP_HOST to enable");
            None
        }
    };

    let addr = config.bind_addr.clone();
    let success_path = config.checkout.success_path.clone();
    let cancel_path = config.checkout.cancel_path.clone();

    // Build application state
    let state = AppState { config: Arc::new(config), stripe, notifier };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        // Checkout API
        .route("/api/checkout", post(create_checkout))
        // Redirect targets for the hosted flow
        .route(&success_path, get(success_page))
        .route(&cancel_path, get(cancel_page))
        // Server-side button fragment
        .route("/checkout/button", get(button_fragment))
        // Client script for rendered buttons
        .nest_service("/assets", ServeDir::new("assets"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🛒 pay-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health           - Health check");
    tracing::info!("  POST /api/checkout     - Create checkout session");
    tracing::info!("  GET  {:<18}- Order summary page", success_path);
    tracing::info!("  GET  {:<18}- Cancel page", cancel_path);
    tracing::info!("  GET  /checkout/button  - Buy-now button fragment");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
