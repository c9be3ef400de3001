//! Cart webhooks: add, remove, modify, summarize

use axum::{body::Bytes, extract::State, Json};
use dialorder_cart::summarize;
use dialorder_core::{format_minor_units, SessionKey};
use serde_json::{json, Value};
use tracing::info;

use super::{load_menu, mutate_cart};
use crate::error::Result;
use crate::payload::WebhookRequest;
use crate::AppState;

pub async fn add_to_cart(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let req = WebhookRequest::from_body(&body)?;
    let item_name = req.item_name()?;
    let quantity = req.quantity()?;
    let call_id = req.call_id()?;
    let to_number = req.to_number()?;
    let instructions = req.special_instructions();
    info!(call_id, item = item_name, quantity, "Add to cart");

    let (location, catalog) = load_menu(&state, to_number).await?;
    let session_key = SessionKey::new(call_id);
    let (cart, added) = mutate_cart(&state, &session_key, |cart| {
        cart.add_item(&catalog, item_name, quantity, instructions)
    })
    .await?;

    info!(call_id, location_id = %location.location_id, item = %added.name, merged = added.merged, "Item added");
    Ok(Json(json!({
        "message": added.message(),
        "cartSummary": summarize(&cart),
    })))
}

pub async fn remove_from_cart(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let req = WebhookRequest::from_body(&body)?;
    let item_name = req.item_name()?;
    let quantity = req.quantity_to_remove()?;
    let call_id = req.call_id()?;
    info!(call_id, item = item_name, quantity = ?quantity, "Remove from cart");

    let session_key = SessionKey::new(call_id);
    let (cart, removed) =
        mutate_cart(&state, &session_key, |cart| cart.remove_item(item_name, quantity)).await?;

    Ok(Json(json!({
        "message": removed.message(),
        "cartSummary": summarize(&cart),
    })))
}

pub async fn add_modifier(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let req = WebhookRequest::from_body(&body)?;
    let item_name = req.item_name()?;
    let modification = req.modification()?;
    let call_id = req.call_id()?;
    info!(call_id, item = item_name, modifier = modification, "Add modifier");

    let session_key = SessionKey::new(call_id);
    let (cart, applied) =
        mutate_cart(&state, &session_key, |cart| cart.add_modifier(item_name, modification)).await?;

    Ok(Json(json!({
        "message": applied.message(),
        "modifier": applied.modifier,
        "lineTotalMinorUnits": applied.line_total_minor_units,
        "lineTotalDisplay": format_minor_units(applied.line_total_minor_units),
        "cartSummary": summarize(&cart),
    })))
}

pub async fn cart_summary(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let req = WebhookRequest::from_body(&body)?;
    let call_id = req.call_id()?;

    let cart = state.carts.load(&SessionKey::new(call_id)).await?;
    let summary = summarize(&cart);
    info!(call_id, items = summary.item_count, "Cart summary");

    Ok(Json(json!({
        "message": summary.human_text.clone(),
        "speechText": summary.speech_text.clone(),
        "cartSummary": summary,
    })))
}
