//! Application State

use std::sync::Arc;

use pay_stripe::StripeClient;

use crate::config::ServerConfig;
use crate::notify::Notifier;

/// Shared application state, explicitly constructed in `main` and
/// injected into every handler - no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    /// Immutable server configuration
    pub config: Arc<ServerConfig>,

    /// Stripe client (None if no secret key is configured)
    pub stripe: Option<Arc<StripeClient>>,

    /// Order-confirmation mailer (None if SMTP is not configured)
    pub notifier: Option<Arc<Notifier>>,
}
