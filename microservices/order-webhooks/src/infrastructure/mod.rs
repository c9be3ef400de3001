//! Infrastructure module: cart and catalog stores

pub mod cart_store;
pub mod catalog_store;

pub use cart_store::{CartStore, LumaCartStore, MemoryCartStore};
pub use catalog_store::{CatalogSeed, CatalogSource, LumaCatalogSource, MemoryCatalogSource};

use dialorder_core::DialorderError;
use dialorder_kv::KvError;

pub(crate) fn kv_error(err: KvError) -> DialorderError {
    if err.is_conflict() {
        DialorderError::Conflict(err.to_string())
    } else {
        DialorderError::Storage(err.to_string())
    }
}
