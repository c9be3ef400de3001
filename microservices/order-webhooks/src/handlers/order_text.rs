//! Order-total text message

use axum::{body::Bytes, extract::State, Json};
use dialorder_core::PhoneNumber;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::notifier::order_total_text;
use crate::payload::WebhookRequest;
use crate::providers::SmsMessage;
use crate::AppState;

pub async fn order_text(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let req = WebhookRequest::from_body(&body)?;
    let total = req.total();
    let customer_phone = req.customer_phone().and_then(PhoneNumber::parse);

    let (Some(total), Some(to)) = (total.clone(), customer_phone) else {
        return Err(ApiError::BadRequest {
            message: "Missing required fields: total and customerPhone".to_string(),
            received: Some(json!({
                "total": total,
                "customerPhone": req.customer_phone(),
            })),
        });
    };

    let location_name = match req.to_number() {
        Ok(to_number) => match PhoneNumber::parse(to_number) {
            Some(phone) => match state.catalog.get_location(&phone).await {
                Ok(location) => Some(location.display_name),
                Err(e) => {
                    warn!(to_number, error = %e, "No location for order text, using default brand");
                    None
                }
            },
            None => None,
        },
        Err(_) => None,
    };
    let brand = location_name
        .or_else(|| state.config.textbelt.sender.clone())
        .unwrap_or_else(|| "us".to_string());

    let message = SmsMessage {
        to,
        body: order_total_text(&brand, &total, state.config.order_text_checkout_url.as_deref()),
        sender: Some(brand),
    };
    let receipt = state.notifier.notify(&message).await?;
    info!(to = %message.to, "Order total text sent");

    Ok(Json(json!({
        "success": true,
        "message": "Order processed and SMS sent successfully",
        "textId": receipt.text_id,
    })))
}
