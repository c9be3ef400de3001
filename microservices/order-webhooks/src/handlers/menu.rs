//! Menu listing for a location

use axum::{
    extract::{Path, State},
    Json,
};
use dialorder_cart::CatalogItem;
use dialorder_core::format_minor_units;
use serde_json::{json, Map, Value};

use super::load_menu;
use crate::error::Result;
use crate::AppState;

fn item_json(item: &CatalogItem) -> Value {
    json!({
        "name": item.canonical_name,
        "priceMinorUnits": item.unit_price_minor_units,
        "price": item.unit_price_minor_units.map(format_minor_units),
        "currency": item.currency,
        "description": item.description,
        "category": item.menu_category(),
        "modifierGroups": item.modifier_groups,
    })
}

pub async fn get_menu(State(state): State<AppState>, Path(phone): Path<String>) -> Result<Json<Value>> {
    let (location, catalog) = load_menu(&state, &phone).await?;

    let items: Vec<Value> = catalog.iter().map(item_json).collect();
    let categorized: Map<String, Value> = catalog
        .by_category()
        .into_iter()
        .map(|(section, items)| (section, items.into_iter().map(item_json).collect()))
        .collect();

    Ok(Json(json!({
        "success": true,
        "location": location,
        "totalItems": catalog.len(),
        "items": items,
        "categorizedItems": categorized,
    })))
}
