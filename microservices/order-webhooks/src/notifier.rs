//! Notifier: SMS texts sent after an order step
//!
//! At checkout the text is a courtesy; a failure is reported in the
//! response body and never fails the request.

use dialorder_cart::Cart;
use dialorder_core::{format_minor_units, PhoneNumber};
use serde::Serialize;
use tracing::{info, warn};

use crate::providers::{Notifier, SmsMessage};

const LISTED_LINES: usize = 3;

/// What happened to the checkout text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsOutcome {
    pub attempted: bool,
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SmsOutcome {
    pub fn not_attempted() -> Self {
        Self::default()
    }
}

/// Send and downgrade any failure to an [`SmsOutcome`]
pub async fn notify_soft(notifier: &dyn Notifier, message: SmsMessage) -> SmsOutcome {
    let to = message.to.to_string();
    match notifier.notify(&message).await {
        Ok(receipt) => {
            info!(to = %to, provider = notifier.provider_id(), "Checkout text sent");
            SmsOutcome {
                attempted: true,
                sent: true,
                to: Some(to),
                text_id: receipt.text_id,
                error: None,
            }
        }
        Err(e) => {
            warn!(to = %to, provider = notifier.provider_id(), error = %e, "Checkout text failed");
            SmsOutcome {
                attempted: true,
                sent: false,
                to: Some(to),
                text_id: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// `"{brand} order ready! Your order: 2x A, 1x B +1 more. Subtotal: $x (+ tax). ..."`
pub fn checkout_text(brand: &str, cart: &Cart, payment_url: &str) -> String {
    let mut listed = cart
        .lines
        .iter()
        .take(LISTED_LINES)
        .map(|line| format!("{}x {}", line.quantity, line.name()))
        .collect::<Vec<_>>()
        .join(", ");
    if cart.lines.len() > LISTED_LINES {
        listed.push_str(&format!(" +{} more", cart.lines.len() - LISTED_LINES));
    }
    let items = if listed.is_empty() {
        String::new()
    } else {
        format!("Your order: {}. ", listed)
    };
    format!(
        "{} order ready! {}Subtotal: ${} (+ tax). Complete your payment here: {}",
        brand,
        items,
        format_minor_units(cart.subtotal_minor_units),
        payment_url
    )
}

/// `$` is added unless the total already carries one.
pub fn order_total_text(brand: &str, total: &str, checkout_url: Option<&str>) -> String {
    let total = if total.starts_with('$') {
        total.to_string()
    } else {
        format!("${}", total)
    };
    let mut text = format!("Thank you for choosing {}! Your order total is {}.", brand, total);
    if let Some(url) = checkout_url {
        text.push_str(&format!(" You can check out here: {}.", url));
    }
    text
}

/// Customer phone from the arguments, else the caller's own number
pub fn checkout_recipient(customer_phone: Option<&str>, from_number: Option<&str>) -> Option<PhoneNumber> {
    customer_phone
        .and_then(PhoneNumber::parse)
        .or_else(|| from_number.and_then(PhoneNumber::parse))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_text() {
        assert_eq!(
            order_total_text("Red Bird Chicken", "25.50", None),
            "Thank you for choosing Red Bird Chicken! Your order total is $25.50."
        );
        assert_eq!(
            order_total_text("Red Bird Chicken", "$25.50", Some("https://example.com/pay")),
            "Thank you for choosing Red Bird Chicken! Your order total is $25.50. \
             You can check out here: https://example.com/pay."
        );
    }

    #[test]
    fn test_checkout_recipient_fallback() {
        assert_eq!(
            checkout_recipient(Some("+15551112222"), Some("+15553334444")).unwrap().as_str(),
            "+15551112222"
        );
        assert_eq!(
            checkout_recipient(Some("  "), Some("+15553334444")).unwrap().as_str(),
            "+15553334444"
        );
        assert!(checkout_recipient(None, None).is_none());
    }
}
