//! Menu resolver: maps what a caller said to a catalog item
//!
//! Three tiers, first match wins: exact canonical name, normalised
//! containment either way, then the colloquial alias table. Ties go to the
//! first item in catalog order.

use tracing::debug;

use crate::catalog::{Catalog, CatalogItem};
use crate::error::{CartError, Result};

/// Colloquial terms mapped to canonical names, checked in this order.
pub const ALIASES: &[(&str, &str)] = &[
    ("fries", "Regular Fries"),
    ("coke", "Soda"),
    ("cola", "Soda"),
    ("drink", "Soda"),
    ("water", "Bottled Water"),
    ("sandwich", "Single Sandwich"),
    ("nugget", "10pc Nuggets"),
    ("tender", "Single Tender"),
    ("bowl", "Chicken Rice Bowl"),
    ("rice", "Chicken Rice Bowl"),
    ("mac", "Mac & Cheese"),
    ("cheese", "Cheese Fries"),
    ("cake", "Toffee Cake"),
    ("dessert", "Toffee Cake"),
];

/// Offered when nothing on the menu shares a word with the query.
pub const POPULAR_ITEMS: &[&str] = &["Single Sandwich", "Chicken Rice Bowl", "10pc Nuggets"];

const MAX_SUGGESTIONS: usize = 3;

/// Lowercase and keep only ASCII letters and digits.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn resolve<'a>(catalog: &'a Catalog, query: &str) -> Result<&'a CatalogItem> {
    if let Some(item) = catalog.get(query) {
        debug!(query, item = %item.canonical_name, "Resolved by exact name");
        return Ok(item);
    }

    let wanted = normalize(query);
    if !wanted.is_empty() {
        let partial = catalog.iter().find(|item| {
            let name = normalize(&item.canonical_name);
            !name.is_empty() && (name.contains(&wanted) || wanted.contains(&name))
        });
        if let Some(item) = partial {
            debug!(query, item = %item.canonical_name, "Resolved by partial name");
            return Ok(item);
        }

        for (alias, canonical) in ALIASES {
            if wanted.contains(alias) || alias.contains(wanted.as_str()) {
                if let Some(item) = catalog.get(canonical) {
                    debug!(query, alias, item = %item.canonical_name, "Resolved by alias");
                    return Ok(item);
                }
            }
        }
    }

    Err(CartError::ItemNotOnMenu {
        query: query.to_string(),
        suggestions: suggestions(catalog, query),
    })
}

/// Up to three catalog names sharing a word with the query, or the popular
/// items when none do.
pub fn suggestions(catalog: &Catalog, query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let mut found: Vec<String> = Vec::new();
    for item in catalog.iter() {
        let name = item.canonical_name.to_lowercase();
        let first_word = name.split(' ').next().unwrap_or_default();
        let shares_word = words
            .iter()
            .any(|word| name.contains(word) || word.contains(first_word));
        if shares_word && !found.contains(&item.canonical_name) {
            found.push(item.canonical_name.clone());
        }
        if found.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    if found.is_empty() {
        found = POPULAR_ITEMS.iter().map(|name| name.to_string()).collect();
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialorder_core::LocationId;

    fn catalog(names: &[&str]) -> Catalog {
        Catalog::new(
            LocationId::new("L1"),
            names.iter().map(|name| CatalogItem {
                canonical_name: name.to_string(),
                unit_price_minor_units: Some(100),
                currency: "USD".to_string(),
                external_item_ref: String::new(),
                external_variation_ref: format!("VAR_{}", name),
                description: String::new(),
                category: String::new(),
                modifier_groups: vec![],
            }),
        )
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Mac & Cheese!"), "maccheese");
        assert_eq!(normalize("  10pc  Nuggets "), "10pcnuggets");
        assert_eq!(normalize("?!"), "");
    }

    #[test]
    fn test_exact_beats_alias() {
        let menu = catalog(&["Coke", "Soda"]);
        assert_eq!(resolve(&menu, "Coke").unwrap().canonical_name, "Coke");
        // Lowercase misses the exact tier but the partial tier still finds it
        // before the alias table is consulted.
        assert_eq!(resolve(&menu, "coke").unwrap().canonical_name, "Coke");
    }

    #[test]
    fn test_partial_either_direction() {
        let menu = catalog(&["Regular Fries", "Single Sandwich"]);
        assert_eq!(resolve(&menu, "single sandwich please").unwrap().canonical_name, "Single Sandwich");
        assert_eq!(resolve(&menu, "regular").unwrap().canonical_name, "Regular Fries");
    }

    #[test]
    fn test_alias_tier() {
        let menu = catalog(&["Mac & Cheese", "Soda", "Regular Fries"]);
        assert_eq!(resolve(&menu, "a cola").unwrap().canonical_name, "Soda");
        assert_eq!(resolve(&menu, "gimme some fries").unwrap().canonical_name, "Regular Fries");
        assert_eq!(resolve(&menu, "mac").unwrap().canonical_name, "Mac & Cheese");
    }

    #[test]
    fn test_alias_with_missing_target_is_skipped() {
        // Cheese Fries is absent; the partial tier still catches Mac & Cheese.
        let menu = catalog(&["Mac & Cheese"]);
        assert_eq!(resolve(&menu, "cheese").unwrap().canonical_name, "Mac & Cheese");
        let menu = catalog(&["Soda"]);
        assert!(resolve(&menu, "toffee dessert").is_err());
    }

    #[test]
    fn test_empty_query_only_matches_exactly() {
        let menu = catalog(&["Soda"]);
        assert!(matches!(resolve(&menu, "!!"), Err(CartError::ItemNotOnMenu { .. })));
    }

    #[test]
    fn test_suggestions_shared_word() {
        let menu = catalog(&["Double Sandwich", "Single Sandwich", "Soda", "Spicy Sandwich"]);
        assert_eq!(
            suggestions(&menu, "pizza sandwich"),
            vec!["Double Sandwich", "Single Sandwich", "Spicy Sandwich"]
        );
    }

    #[test]
    fn test_suggestions_fall_back_to_popular() {
        let menu = catalog(&["Soda"]);
        let Err(CartError::ItemNotOnMenu { query, suggestions }) = resolve(&menu, "pizza") else {
            panic!("expected not on menu");
        };
        assert_eq!(query, "pizza");
        assert_eq!(suggestions, POPULAR_ITEMS);
    }
}
