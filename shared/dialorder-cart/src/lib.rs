//! Dialorder Cart - the ordering core shared by every webhook
//!
//! - [`catalog`]: locations, catalog items and their modifier groups
//! - [`resolver`]: free-text item name to catalog item (exact, partial, alias)
//! - [`cart`]: per-call cart with merge, removal and modifier rules
//! - [`summary`] / [`speech`]: display and text-to-speech friendly summaries
//! - [`order`]: provider-facing order assembled from a finished cart
//!
//! Nothing in this crate performs I/O. Money is integer minor units
//! throughout and only rendered to text at the edges.

pub mod cart;
pub mod catalog;
pub mod error;
pub mod order;
pub mod resolver;
pub mod speech;
pub mod summary;


pub use cart::{AddedItem, AppliedModifier, Cart, CartLineItem, ModifierApplied, RemovedItem};
pub use catalog::{Catalog, CatalogItem, Location, ModifierGroup, ModifierOption};
pub use error::{CartError, Result};
pub use order::{assemble, ProviderLineItem, ProviderOrder};
pub use resolver::{resolve, suggestions};
pub use summary::{summarize, CartSummary, TAX_MESSAGE};
