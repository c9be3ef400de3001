//! Checkout: provider order, hosted payment link and the customer text

use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use dialorder_cart::{assemble, CartError, TAX_MESSAGE};
use dialorder_core::{format_minor_units, unix_millis, SessionKey};
use rand::Rng;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{mutate_cart, not_found_as_404, parse_phone};
use crate::error::Result;
use crate::notifier::{checkout_recipient, checkout_text, notify_soft, SmsOutcome};
use crate::payload::WebhookRequest;
use crate::providers::{PaymentLinkRequest, SmsMessage};
use crate::AppState;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `ORDER_{millis}_{9 base36 chars}`, fresh for every attempt
pub(crate) fn idempotency_key(millis: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("ORDER_{}_{}", millis, suffix)
}

pub async fn checkout(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let req = WebhookRequest::from_body(&body)?;
    let call_id = req.call_id()?;
    let to_number = req.to_number()?;
    info!(call_id, "Checkout");

    let session_key = SessionKey::new(call_id);
    let cart = state.carts.load(&session_key).await?;
    if cart.is_empty() {
        return Err(CartError::EmptyCart.into());
    }

    let phone = parse_phone(to_number, "call.to_number")?;
    let location = state.catalog.get_location(&phone).await.map_err(not_found_as_404)?;
    let order = assemble(&cart)?;

    let now = Utc::now();
    let millis = unix_millis(now);
    let request = PaymentLinkRequest {
        location_id: location.location_id.clone(),
        order: order.clone(),
        description: req.description().map(str::to_string).unwrap_or_else(|| {
            format!("{} Order - {} items", location.display_name, order.item_count)
        }),
        reference_id: format!("ORDER-{}", millis),
        idempotency_key: idempotency_key(millis),
        source_name: state.config.square.source_name.clone(),
    };
    let link = state.payments.create_payment_link(&request).await?;

    let sms = match checkout_recipient(req.customer_phone(), req.from_number()) {
        Some(to) => {
            let sender = state
                .config
                .textbelt
                .sender
                .clone()
                .unwrap_or_else(|| location.display_name.clone());
            let message = SmsMessage {
                to,
                body: checkout_text(&location.display_name, &cart, &link.url),
                sender: Some(sender),
            };
            notify_soft(state.notifier.as_ref(), message).await
        }
        None => {
            info!(call_id, "No phone number for checkout text");
            SmsOutcome::not_attempted()
        }
    };

    if state.config.clear_cart_on_checkout {
        let cleared = mutate_cart(&state, &session_key, |cart| {
            cart.clear();
            Ok::<(), CartError>(())
        })
        .await;
        if let Err(e) = cleared {
            warn!(call_id, error = %e, "Could not clear cart after checkout");
        }
    }

    info!(
        call_id,
        location_id = %location.location_id,
        order_id = %link.order_id,
        sms_sent = sms.sent,
        "Checkout complete"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Order created and payment link generated",
        "orderSummary": {
            "itemCount": order.item_count,
            "subtotal": order.subtotal_minor_units,
            "subtotalDisplay": format_minor_units(order.subtotal_minor_units),
            "taxMessage": TAX_MESSAGE,
            "createdAt": now.to_rfc3339(),
        },
        "paymentLink": link,
        "sms": sms,
        "providerLineItems": order.line_items,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_key_shape() {
        let key = idempotency_key(1_700_000_000_000);
        let suffix = key.strip_prefix("ORDER_1700000000000_").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
        assert_ne!(key, idempotency_key(1_700_000_000_000));
    }
}
