//! Cart summaries for display and for the voice agent

use dialorder_core::format_minor_units;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLineItem};
use crate::speech;

/// Tax is left to the payment provider and never computed here.
pub const TAX_MESSAGE: &str = "Tax will be calculated by Square at checkout";

pub const EMPTY_CART_TEXT: &str = "Your cart is empty.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: Vec<CartLineItem>,
    pub item_count: u64,
    pub subtotal_minor_units: i64,
    pub subtotal_display: String,
    pub human_text: String,
    pub speech_text: String,
    pub tax_message: String,
}

pub fn summarize(cart: &Cart) -> CartSummary {
    let subtotal_display = format_minor_units(cart.subtotal_minor_units);
    let (human_text, speech_text) = if cart.is_empty() {
        (EMPTY_CART_TEXT.to_string(), EMPTY_CART_TEXT.to_string())
    } else {
        let human = cart
            .lines
            .iter()
            .map(|line| {
                if line.special_instructions.is_empty() {
                    format!("{} {}", line.quantity, line.name())
                } else {
                    format!("{} {} ({})", line.quantity, line.name(), line.special_instructions)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let spoken = cart
            .lines
            .iter()
            .map(speech::speak_line)
            .collect::<Vec<_>>()
            .join(", ");
        let closing = format!("Subtotal: ${}. {}.", subtotal_display, TAX_MESSAGE);
        (
            format!("Your order: {}. {}", human, closing),
            format!("Your order: {}. {}", spoken, closing),
        )
    };

    CartSummary {
        lines: cart.lines.clone(),
        item_count: cart.item_count,
        subtotal_minor_units: cart.subtotal_minor_units,
        subtotal_display,
        human_text,
        speech_text,
        tax_message: TAX_MESSAGE.to_string(),
    }
}
