//! Buy-Now Button Markup
//!
//! Renders the `<button>` fragment the client script hooks onto. The
//! product data rides in `data-*` attributes; maud escapes every value,
//! so attacker-controlled product names cannot break out of the markup.

use maud::{Markup, html};

/// CSS class the client script binds its click handler to
pub const BUTTON_CLASS: &str = "stripe-checkout-button";

/// Options for one rendered button
#[derive(Clone, Debug)]
pub struct ButtonOptions {
    pub product_id: String,

    /// Decimal price, passed through verbatim to the checkout POST
    pub price: String,

    pub name: String,
    pub image: Option<String>,
    pub currency: Option<String>,

    /// Visible label; defaults to "Buy Now"
    pub button_text: String,

    /// Extra CSS classes appended after [`BUTTON_CLASS`]
    pub css_class: Option<String>,

    pub style: Option<String>,
    pub disabled: bool,
}

/// Render the buy-now button fragment
pub fn buy_button(opts: &ButtonOptions) -> Markup {
    let class = opts.css_class.as_deref().map_or_else(
        || BUTTON_CLASS.to_string(),
        |extra| format!("{BUTTON_CLASS} {extra}"),
    );

    html! {
        button class=(class)
            style=[opts.style.as_deref()]
            disabled[opts.disabled]
            data-product-id=(opts.product_id)
            data-price=(opts.price)
            data-name=(opts.name)
            data-image=[opts.image.as_deref()]
            data-currency=[opts.currency.as_deref()] {
            span { (opts.button_text) }
        }
    }
}

/// Rendered in place of the button when required parameters are absent
pub fn missing_params_error() -> Markup {
    html! {
        div class="error" { "Missing required payment button parameters" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ButtonOptions {
        ButtonOptions {
            product_id: "prod_42".into(),
            price: "29.99".into(),
            name: "Art Print".into(),
            image: None,
            currency: None,
            button_text: "Buy Now".into(),
            css_class: None,
            style: None,
            disabled: false,
        }
    }

    #[test]
    fn test_button_carries_data_attributes() {
        let markup = buy_button(&options()).into_string();
        assert!(markup.contains("data-product-id=\"prod_42\""));
        assert!(markup.contains("data-price=\"29.99\""));
        assert!(markup.contains("data-name=\"Art Print\""));
        assert!(markup.contains("class=\"stripe-checkout-button\""));
        assert!(markup.contains("<span>Buy Now</span>"));
        assert!(!markup.contains("disabled"));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut opts = options();
        opts.name = "\"><script>alert(1)</script>".into();
        let markup = buy_button(&opts).into_string();
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_custom_class_and_disabled() {
        let mut opts = options();
        opts.css_class = Some("btn-primary".into());
        opts.disabled = true;
        let markup = buy_button(&opts).into_string();
        assert!(markup.contains("class=\"stripe-checkout-button btn-primary\""));
        assert!(markup.contains("disabled"));
    }
}
