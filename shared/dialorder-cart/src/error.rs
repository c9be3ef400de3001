//! Cart engine error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CartError>;

/// Expected outcomes of cart operations that the caller must be told about.
///
/// Every variant leaves the cart untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    #[error("Item \"{query}\" not found on menu")]
    ItemNotOnMenu {
        query: String,
        suggestions: Vec<String>,
    },

    #[error("Item \"{query}\" not found in cart")]
    ItemNotInCart {
        query: String,
        current_items: Vec<String>,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Modifier \"{modifier}\" is not available for {item}")]
    ModifierNotFound {
        item: String,
        modifier: String,
        available: Vec<String>,
    },

    #[error("Modifier \"{modifier}\" is already applied to {item}")]
    AlreadyApplied { item: String, modifier: String },

    #[error("Item \"{item}\" has no price on file. Please clear the cart and add it again")]
    IncompleteLineItem { item: String },
}

impl CartError {
    /// True for errors caused by something the caller asked for, as opposed
    /// to stale data in the cart itself.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::IncompleteLineItem { .. })
    }
}
