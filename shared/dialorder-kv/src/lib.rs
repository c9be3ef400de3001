//! Dialorder KV
//!
//! Versioned key-value tables on top of LumaDB (PostgreSQL wire protocol).
//! Provides connection pooling, TTL-aware reads and compare-and-swap writes.

mod error;
mod kv;
mod pool;
mod types;

pub use error::{KvError, Result};
pub use kv::KvTable;
pub use pool::{KvPool, PoolConfig};
pub use types::*;
