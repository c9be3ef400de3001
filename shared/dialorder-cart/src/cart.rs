//! Per-call cart and the rules for changing it
//!
//! Every operation validates before it touches the cart, so an `Err` always
//! leaves lines and totals exactly as they were. Line and cart totals are
//! recomputed after each successful change.

use chrono::{DateTime, Utc};
use dialorder_core::SessionKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalog, CatalogItem};
use crate::error::{CartError, Result};
use crate::resolver;

/// Which unit of a multi-piece item a modifier targets, taken from a
/// trailing `" 1"` or `" 2"` on the modifier name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Piece {
    First,
    Second,
}

impl Piece {
    pub fn ordinal(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
        }
    }
}

/// Split `"Mild 2"` into `("Mild", Some(Piece::Second))`.
pub fn split_piece_suffix(name: &str) -> (&str, Option<Piece>) {
    if let Some(base) = name.strip_suffix(" 1") {
        (base, Some(Piece::First))
    } else if let Some(base) = name.strip_suffix(" 2") {
        (base, Some(Piece::Second))
    } else {
        (name, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedModifier {
    pub group_ref: String,
    pub option_ref: String,
    pub name: String,
    pub price_delta_minor_units: i64,
}

impl AppliedModifier {
    pub fn piece(&self) -> Option<Piece> {
        split_piece_suffix(&self.name).1
    }

    fn same_option(&self, other: &AppliedModifier) -> bool {
        let same_ref = if self.option_ref.is_empty() || other.option_ref.is_empty() {
            split_piece_suffix(&self.name)
                .0
                .eq_ignore_ascii_case(split_piece_suffix(&other.name).0)
        } else {
            self.option_ref == other.option_ref
        };
        same_ref && self.piece() == other.piece()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Copied when the line was created; later catalog edits do not reach
    /// an order already in progress.
    pub catalog_ref: CatalogItem,
    pub quantity: u32,
    #[serde(default)]
    pub special_instructions: String,
    #[serde(default)]
    pub modifiers: Vec<AppliedModifier>,
    pub line_total_minor_units: i64,
}

impl CartLineItem {
    fn new(item: &CatalogItem, quantity: u32, special_instructions: &str) -> Self {
        let mut line = Self {
            catalog_ref: item.clone(),
            quantity,
            special_instructions: special_instructions.to_string(),
            modifiers: Vec::new(),
            line_total_minor_units: 0,
        };
        line.recompute();
        line
    }

    pub fn name(&self) -> &str {
        &self.catalog_ref.canonical_name
    }

    /// Base price plus modifier deltas. A missing base price counts as zero
    /// here and is refused at checkout.
    pub fn unit_price_minor_units(&self) -> i64 {
        self.catalog_ref.unit_price_minor_units.unwrap_or(0)
            + self
                .modifiers
                .iter()
                .map(|m| m.price_delta_minor_units)
                .sum::<i64>()
    }

    fn merge_ref(&self) -> &str {
        merge_ref(&self.catalog_ref)
    }

    fn recompute(&mut self) {
        self.line_total_minor_units = self.unit_price_minor_units() * i64::from(self.quantity);
    }
}

fn merge_ref(item: &CatalogItem) -> &str {
    if item.external_variation_ref.is_empty() {
        &item.canonical_name
    } else {
        &item.external_variation_ref
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedItem {
    pub name: String,
    pub quantity: u32,
    /// True when the quantity went onto an existing line.
    pub merged: bool,
}

impl AddedItem {
    pub fn message(&self) -> String {
        format!("Added {} {} to cart", self.quantity, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedItem {
    pub name: String,
    pub quantity: u32,
    pub line_removed: bool,
}

impl RemovedItem {
    pub fn message(&self) -> String {
        format!("Removed {} {} from cart", self.quantity, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifierApplied {
    pub item_name: String,
    pub modifier: AppliedModifier,
    pub line_total_minor_units: i64,
}

impl ModifierApplied {
    pub fn message(&self) -> String {
        format!("Added {} to {}", self.modifier.name, self.item_name)
    }
}

/// The order in progress for one phone call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub session_key: SessionKey,
    #[serde(default)]
    pub lines: Vec<CartLineItem>,
    #[serde(default)]
    pub subtotal_minor_units: i64,
    #[serde(default)]
    pub item_count: u64,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Store version this cart was loaded at; 0 for a cart never saved.
    #[serde(default)]
    pub version: i64,
}

impl Cart {
    pub fn new(session_key: SessionKey) -> Self {
        Self {
            session_key,
            lines: Vec::new(),
            subtotal_minor_units: 0,
            item_count: 0,
            expires_at: None,
            version: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_names(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.name().to_string()).collect()
    }

    /// Resolve `item_name` against the catalog and add `quantity` of it,
    /// merging into an existing line with the same variation and the same
    /// special instructions.
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        item_name: &str,
        quantity: i64,
        special_instructions: &str,
    ) -> Result<AddedItem> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(CartError::InvalidQuantity)?;
        let item = resolver::resolve(catalog, item_name)?;

        let existing = self.lines.iter_mut().find(|line| {
            line.merge_ref() == merge_ref(item) && line.special_instructions == special_instructions
        });
        let merged = match existing {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::InvalidQuantity)?;
                line.recompute();
                true
            }
            None => {
                self.lines
                    .push(CartLineItem::new(item, quantity, special_instructions));
                false
            }
        };
        self.recompute_totals();

        debug!(session = %self.session_key, item = %item.canonical_name, quantity, merged, "Item added");
        Ok(AddedItem {
            name: item.canonical_name.clone(),
            quantity,
            merged,
        })
    }

    /// Remove `quantity` of the first line whose name contains the query or
    /// is contained by it, ignoring case. `None` removes the whole line.
    pub fn remove_item(&mut self, item_name: &str, quantity: Option<i64>) -> Result<RemovedItem> {
        if self.is_empty() {
            return Err(CartError::EmptyCart);
        }
        if matches!(quantity, Some(q) if q <= 0) {
            return Err(CartError::InvalidQuantity);
        }

        let wanted = item_name.to_lowercase();
        let index = self
            .lines
            .iter()
            .position(|line| {
                let name = line.name().to_lowercase();
                name.contains(&wanted) || wanted.contains(&name)
            })
            .ok_or_else(|| CartError::ItemNotInCart {
                query: item_name.to_string(),
                current_items: self.line_names(),
            })?;

        let line = &mut self.lines[index];
        let name = line.name().to_string();
        let requested = quantity.unwrap_or(i64::from(line.quantity));
        let removed = if requested >= i64::from(line.quantity) {
            let removed = line.quantity;
            self.lines.remove(index);
            RemovedItem {
                name,
                quantity: removed,
                line_removed: true,
            }
        } else {
            // requested < line.quantity, so it fits in u32
            let removed = requested as u32;
            line.quantity -= removed;
            line.recompute();
            RemovedItem {
                name,
                quantity: removed,
                line_removed: false,
            }
        };
        self.recompute_totals();

        debug!(session = %self.session_key, item = %removed.name, quantity = removed.quantity, "Item removed");
        Ok(removed)
    }

    /// Attach a modifier to the most recently added line for `item_name`.
    ///
    /// `"Mild 2"` falls back to the `"Mild"` option when the catalog has no
    /// piece-numbered option; the applied name keeps the suffix so speech
    /// can say which piece it belongs to.
    pub fn add_modifier(&mut self, item_name: &str, modifier_name: &str) -> Result<ModifierApplied> {
        if self.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let wanted = item_name.trim();
        let index = self
            .lines
            .iter()
            .rposition(|line| line.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CartError::ItemNotInCart {
                query: item_name.to_string(),
                current_items: self.line_names(),
            })?;

        let line = &self.lines[index];
        let modifier_name = modifier_name.trim();
        let applied = match line.catalog_ref.find_modifier(modifier_name) {
            Some((group, option)) => AppliedModifier {
                group_ref: group.external_ref.clone(),
                option_ref: option.external_ref.clone(),
                name: option.name.clone(),
                price_delta_minor_units: option.price_delta_minor_units,
            },
            None => {
                let (base, piece) = split_piece_suffix(modifier_name);
                let found = piece.and_then(|_| line.catalog_ref.find_modifier(base));
                let Some((group, option)) = found else {
                    return Err(CartError::ModifierNotFound {
                        item: line.name().to_string(),
                        modifier: modifier_name.to_string(),
                        available: line.catalog_ref.modifier_names(),
                    });
                };
                let suffix = &modifier_name[base.len()..];
                AppliedModifier {
                    group_ref: group.external_ref.clone(),
                    option_ref: option.external_ref.clone(),
                    name: format!("{}{}", option.name, suffix),
                    price_delta_minor_units: option.price_delta_minor_units,
                }
            }
        };

        if line.modifiers.iter().any(|m| m.same_option(&applied)) {
            return Err(CartError::AlreadyApplied {
                item: line.name().to_string(),
                modifier: applied.name,
            });
        }

        let line = &mut self.lines[index];
        line.modifiers.push(applied.clone());
        line.recompute();
        let detail = ModifierApplied {
            item_name: line.name().to_string(),
            modifier: applied,
            line_total_minor_units: line.line_total_minor_units,
        };
        self.recompute_totals();

        debug!(session = %self.session_key, item = %detail.item_name, modifier = %detail.modifier.name, "Modifier applied");
        Ok(detail)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.recompute_totals();
    }

    pub fn recompute_totals(&mut self) {
        for line in &mut self.lines {
            line.recompute();
        }
        self.subtotal_minor_units = self.lines.iter().map(|l| l.line_total_minor_units).sum();
        self.item_count = self.lines.iter().map(|l| u64::from(l.quantity)).sum();
    }
}
