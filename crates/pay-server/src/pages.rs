//! Checkout Result Pages
//!
//! Server-rendered success and cancel pages. Typed maud views keep the
//! session data escaped; no string concatenation anywhere.

use maud::{DOCTYPE, Markup, html};
use pay_stripe::SessionSummary;

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
            }
            body {
                main class="checkout-page" { (body) }
            }
        }
    }
}

/// Order-summary page shown after Stripe redirects back.
///
/// Three states: a retrieved session, a lookup failure (error banner,
/// never a raw provider error), or no `session_id` at all.
pub fn success(summary: Option<&SessionSummary>, error: bool) -> Markup {
    layout(
        "Order confirmation",
        html! {
            h1 { "Thank you for your order" }
            @if error {
                div class="checkout-error" {
                    p { "Unable to retrieve payment information" }
                }
            } @else {
                @if let Some(session) = summary {
                    dl class="order-summary" {
                        dt { "Amount" }
                        dd { (session.amount_display) " " (session.currency) }

                        dt { "Payment status" }
                        dd { (session.payment_status) }

                        @if let Some(email) = &session.customer_email {
                            dt { "Receipt sent to" }
                            dd { (email) }
                        }

                        @if !session.created_date.is_empty() {
                            dt { "Date" }
                            dd { (session.created_date) }
                        }
                    }
                    p {
                        a href=(session.product_url) { "Return to product page" }
                    }
                } @else {
                    p { "No checkout session to display." }
                }
            }
        },
    )
}

/// Page shown when the customer backs out of the hosted checkout
pub fn cancel() -> Markup {
    layout(
        "Checkout cancelled",
        html! {
            h1 { "Checkout cancelled" }
            p { "Your payment was not processed. You can close this page or try again." }
            p {
                a href="/" { "Back to the site" }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> SessionSummary {
        SessionSummary {
            id: "cs_test_1".into(),
            amount_display: "$29.99".into(),
            currency: "USD".into(),
            customer_email: Some("buyer@example.com".into()),
            customer_name: None,
            payment_status: "paid".into(),
            created_date: "November 14, 2023".into(),
            product_url: "https://shop.example.com/products/print".into(),
            referrer_url: "/".into(),
        }
    }

    #[test]
    fn test_success_renders_order_summary() {
        let page = success(Some(&summary()), false).into_string();
        assert!(page.contains("$29.99"));
        assert!(page.contains("buyer@example.com"));
        assert!(page.contains("https://shop.example.com/products/print"));
        assert!(!page.contains("checkout-error"));
    }

    #[test]
    fn test_success_degrades_to_error_banner() {
        let page = success(None, true).into_string();
        assert!(page.contains("Unable to retrieve payment information"));
    }

    #[test]
    fn test_success_without_session() {
        let page = success(None, false).into_string();
        assert!(page.contains("No checkout session to display."));
    }

    #[test]
    fn test_cancel_page() {
        let page = cancel().into_string();
        assert!(page.contains("Checkout cancelled"));
    }
}
