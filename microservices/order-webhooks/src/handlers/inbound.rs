//! Inbound call webhook: dynamic variables for the voice agent

use axum::{body::Bytes, extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::info;

use super::load_menu;
use crate::error::{ApiError, Result};
use crate::payload::decode_body;
use crate::AppState;

fn text_field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    value[name].as_str().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn inbound_call(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let body = decode_body(&body)?;

    if body["event"].as_str() != Some("call_inbound") {
        return Err(ApiError::BadRequest {
            message: "Invalid event type. Expected call_inbound".to_string(),
            received: Some(body["event"].clone()),
        });
    }

    let call = &body["call_inbound"];
    let Some(from_number) = text_field(call, "from_number") else {
        return Err(ApiError::BadRequest {
            message: "Missing from_number in call_inbound payload".to_string(),
            received: Some(call.clone()),
        });
    };
    let Some(to_number) = text_field(call, "to_number") else {
        return Err(ApiError::BadRequest {
            message: "Missing to_number in call_inbound payload - cannot determine location".to_string(),
            received: Some(call.clone()),
        });
    };

    let (location, catalog) = load_menu(&state, to_number).await?;
    let now = Utc::now();
    let store_status = state.config.store_hours.status(now);
    info!(
        location_id = %location.location_id,
        items = catalog.len(),
        store_status,
        "Inbound call"
    );

    Ok(Json(json!({
        "call_inbound": {
            "dynamic_variables": {
                "caller_number": from_number,
                "menu_item_names": catalog.priced_item_list(),
                "store_status": store_status,
            },
            "metadata": {
                "request_timestamp": now.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        },
    })))
}
