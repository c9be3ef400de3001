//! Order assembly: a finished cart in the shape the payment provider wants

use dialorder_core::DEFAULT_CURRENCY;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CartError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLineItem {
    pub name: String,
    pub quantity: u32,
    /// Base price with modifier deltas already folded in.
    pub unit_price_minor_units: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOrder {
    pub line_items: Vec<ProviderLineItem>,
    pub subtotal_minor_units: i64,
    pub item_count: u64,
    pub currency: String,
}

/// One provider line per cart line. Fails if the cart is empty or a line
/// was added without a price.
pub fn assemble(cart: &Cart) -> Result<ProviderOrder> {
    if cart.is_empty() {
        return Err(CartError::EmptyCart);
    }

    let line_items = cart
        .lines
        .iter()
        .map(|line| {
            if line.catalog_ref.unit_price_minor_units.is_none() {
                return Err(CartError::IncompleteLineItem {
                    item: line.name().to_string(),
                });
            }
            let note = Some(line.special_instructions.trim())
                .filter(|note| !note.is_empty())
                .map(str::to_string);
            Ok(ProviderLineItem {
                name: line.name().to_string(),
                quantity: line.quantity,
                unit_price_minor_units: line.unit_price_minor_units(),
                currency: line.catalog_ref.currency.clone(),
                note,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let currency = line_items
        .first()
        .map(|item| item.currency.clone())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Ok(ProviderOrder {
        line_items,
        subtotal_minor_units: cart.subtotal_minor_units,
        item_count: cart.item_count,
        currency,
    })
}
