//! Location and catalog model
//!
//! Populated by the catalog sync process and read-only here. A catalog is
//! keyed by canonical item name and iterates in ascending name order.

use dialorder_core::{format_minor_units, LocationId, PhoneNumber, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// A restaurant outlet, resolved from the number the caller dialled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub location_id: LocationId,
    pub display_name: String,
    pub phone_number: PhoneNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierOption {
    pub name: String,
    #[serde(default)]
    pub price_delta_minor_units: i64,
    #[serde(default)]
    pub external_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierGroup {
    pub name: String,
    #[serde(default)]
    pub external_ref: String,
    #[serde(default)]
    pub options: Vec<ModifierOption>,
}

/// A sellable product at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub canonical_name: String,
    /// `None` when the sync could not find a price; such items can be
    /// carted but not checked out.
    #[serde(default)]
    pub unit_price_minor_units: Option<i64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub external_item_ref: String,
    #[serde(default)]
    pub external_variation_ref: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub modifier_groups: Vec<ModifierGroup>,
}

impl CatalogItem {
    /// Find an option by name across all groups, exact match first and
    /// then ignoring ASCII case.
    pub fn find_modifier(&self, name: &str) -> Option<(&ModifierGroup, &ModifierOption)> {
        let options = || {
            self.modifier_groups
                .iter()
                .flat_map(|group| group.options.iter().map(move |option| (group, option)))
        };
        options()
            .find(|(_, option)| option.name == name)
            .or_else(|| options().find(|(_, option)| option.name.eq_ignore_ascii_case(name)))
    }

    pub fn modifier_names(&self) -> Vec<String> {
        self.modifier_groups
            .iter()
            .flat_map(|group| group.options.iter().map(|option| option.name.clone()))
            .collect()
    }

    /// Name with price as read to the caller, e.g. `Soda $2.49`.
    pub fn priced_label(&self) -> String {
        format!(
            "{} ${}",
            self.canonical_name,
            format_minor_units(self.unit_price_minor_units.unwrap_or(0))
        )
    }

    /// Menu section: the catalog category, or a keyword guess when the
    /// sync left it empty.
    pub fn menu_category(&self) -> String {
        if !self.category.trim().is_empty() {
            return self.category.clone();
        }
        let name = self.canonical_name.to_lowercase();
        let section = if name.contains("sandwich") {
            "sandwiches"
        } else if name.contains("tender") {
            "tenders"
        } else if name.contains("nugget") {
            "nuggets"
        } else if name.contains("fries") || name.contains("mac") || name.contains("slaw") {
            "sides"
        } else if name.contains("bowl") || name.contains("rice") {
            "rice_bowls"
        } else if name.contains("soda") || name.contains("water") {
            "drinks"
        } else if name.contains("cake") {
            "desserts"
        } else {
            "uncategorized"
        };
        section.to_string()
    }
}

/// All items sold at one location, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub items: BTreeMap<String, CatalogItem>,
}

impl Catalog {
    pub fn new(location_id: LocationId, items: impl IntoIterator<Item = CatalogItem>) -> Self {
        Self {
            location_id: Some(location_id),
            items: items
                .into_iter()
                .map(|item| (item.canonical_name.clone(), item))
                .collect(),
        }
    }

    pub fn get(&self, canonical_name: &str) -> Option<&CatalogItem> {
        self.items.get(canonical_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `"Name $x.xx"` for every item, sorted by name and comma-joined.
    pub fn priced_item_list(&self) -> String {
        self.iter()
            .map(CatalogItem::priced_label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Items grouped by [`CatalogItem::menu_category`].
    pub fn by_category(&self) -> BTreeMap<String, Vec<&CatalogItem>> {
        let mut sections: BTreeMap<String, Vec<&CatalogItem>> = BTreeMap::new();
        for item in self.iter() {
            sections.entry(item.menu_category()).or_default().push(item);
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: Option<i64>, category: &str) -> CatalogItem {
        CatalogItem {
            canonical_name: name.to_string(),
            unit_price_minor_units: price,
            currency: "USD".to_string(),
            external_item_ref: format!("ITEM_{}", name),
            external_variation_ref: format!("VAR_{}", name),
            description: String::new(),
            category: category.to_string(),
            modifier_groups: vec![],
        }
    }

    #[test]
    fn test_priced_item_list_sorted() {
        let catalog = Catalog::new(
            LocationId::new("L1"),
            vec![item("Soda", Some(249), ""), item("Mac & Cheese", None, "")],
        );
        assert_eq!(catalog.priced_item_list(), "Mac & Cheese $0.00, Soda $2.49");
    }

    #[test]
    fn test_menu_category_keyword_fallback() {
        assert_eq!(item("Single Sandwich", None, "").menu_category(), "sandwiches");
        assert_eq!(item("Cole Slaw", None, "").menu_category(), "sides");
        assert_eq!(item("Bottled Water", None, "").menu_category(), "drinks");
        assert_eq!(item("Mystery Box", None, "").menu_category(), "uncategorized");
        assert_eq!(item("Single Sandwich", None, "Mains").menu_category(), "Mains");
    }

    #[test]
    fn test_find_modifier_case_insensitive() {
        let mut sandwich = item("Single Sandwich", Some(999), "");
        sandwich.modifier_groups.push(ModifierGroup {
            name: "Spice".to_string(),
            external_ref: "G1".to_string(),
            options: vec![ModifierOption {
                name: "Extra Hot".to_string(),
                price_delta_minor_units: 0,
                external_ref: "O1".to_string(),
            }],
        });
        let (group, option) = sandwich.find_modifier("extra hot").unwrap();
        assert_eq!(group.external_ref, "G1");
        assert_eq!(option.external_ref, "O1");
        assert!(sandwich.find_modifier("mild").is_none());
    }

    #[test]
    fn test_catalog_deserializes_with_defaults() {
        let json = r#"{
            "locationId": "L1",
            "items": {
                "Soda": {"canonicalName": "Soda", "unitPriceMinorUnits": 249}
            }
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        let soda = catalog.get("Soda").unwrap();
        assert_eq!(soda.currency, "USD");
        assert!(soda.modifier_groups.is_empty());
    }
}
