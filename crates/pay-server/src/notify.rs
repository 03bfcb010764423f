//! Order Confirmation Email
//!
//! Sends a plain-text notification when the success page sees a paid
//! session. Delivery failures are logged and swallowed; a lost email
//! must never block or break the page.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pay_stripe::SessionSummary;

use crate::config::SmtpConfig;

/// SMTP mailer for purchase notifications
pub struct Notifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Notifier {
    /// Build the mailer from validated SMTP settings
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?;

        if let Some(port) = config.port {
            builder = builder.port(port);
        }

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.from.parse()?,
            to: config.to.parse()?,
        })
    }

    /// Send an order confirmation for a paid session
    pub async fn send_receipt(&self, summary: &SessionSummary) {
        let message = match self.build_message(summary) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("could not build order email: {e}");
                return;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => tracing::info!(session_id = %summary.id, "order email sent"),
            Err(e) => tracing::warn!(session_id = %summary.id, "order email failed: {e}"),
        }
    }

    fn build_message(&self, summary: &SessionSummary) -> anyhow::Result<Message> {
        let subject =
            format!("Payment received: {} {}", summary.amount_display, summary.currency);

        let customer = summary
            .customer_email
            .as_deref()
            .unwrap_or("(no email collected)");

        let body = format!(
            "A checkout completed.\n\n\
             Session:  {}\n\
             Amount:   {} {}\n\
             Status:   {}\n\
             Customer: {}\n\
             Date:     {}\n\
             Product:  {}\n",
            summary.id,
            summary.amount_display,
            summary.currency,
            summary.payment_status,
            customer,
            summary.created_date,
            summary.product_url,
        );

        Ok(Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)?)
    }
}
