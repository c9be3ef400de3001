//! Cart Store - per-call carts with a short TTL
//!
//! `save` is a compare-and-swap on the version `load` returned. A stale
//! version fails with `DialorderError::Conflict` and the caller reloads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dialorder_cart::Cart;
use dialorder_core::{DialorderError, Result, SessionKey};
use dialorder_kv::KvTable;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::kv_error;

pub const CART_TABLE: &str = "call_carts";

#[async_trait]
pub trait CartStore: Send + Sync {
    fn backend(&self) -> &'static str;

    /// The live cart for a call, or an empty cart at version 0.
    async fn load(&self, session_key: &SessionKey) -> Result<Cart>;

    /// Persist the cart and refresh its expiry. Returns the stored cart with
    /// its new version.
    async fn save(&self, cart: &Cart) -> Result<Cart>;

    /// Drop expired carts; returns how many were removed.
    async fn sweep_expired(&self) -> Result<u64>;

    async fn is_healthy(&self) -> bool;
}

fn chrono_ttl(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(2))
}

fn is_live(cart: &Cart, now: DateTime<Utc>) -> bool {
    cart.expires_at.map_or(true, |at| at > now)
}

/// In-process carts; lost on restart
#[derive(Clone)]
pub struct MemoryCartStore {
    carts: Arc<DashMap<SessionKey, Cart>>,
    ttl: Duration,
}

impl MemoryCartStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            carts: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Remove expired carts (called periodically)
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.carts.len();
        self.carts.retain(|_, cart| is_live(cart, now));
        before - self.carts.len()
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, session_key: &SessionKey) -> Result<Cart> {
        let now = Utc::now();
        match self.carts.get(session_key) {
            Some(cart) if is_live(&cart, now) => Ok(cart.clone()),
            _ => Ok(Cart::new(session_key.clone())),
        }
    }

    async fn save(&self, cart: &Cart) -> Result<Cart> {
        let now = Utc::now();
        let mut saved = cart.clone();
        saved.expires_at = Some(now + chrono_ttl(self.ttl));

        match self.carts.entry(cart.session_key.clone()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get();
                let live_version = if is_live(stored, now) { stored.version } else { 0 };
                if live_version != cart.version {
                    return Err(DialorderError::Conflict(format!(
                        "cart {} is at version {}, not {}",
                        cart.session_key, live_version, cart.version
                    )));
                }
                saved.version = stored.version + 1;
                entry.insert(saved.clone());
            }
            Entry::Vacant(entry) => {
                if cart.version != 0 {
                    return Err(DialorderError::Conflict(format!(
                        "cart {} no longer exists",
                        cart.session_key
                    )));
                }
                saved.version = 1;
                entry.insert(saved.clone());
            }
        }

        debug!(call_id = %saved.session_key, version = saved.version, "Cart saved");
        Ok(saved)
    }

    async fn sweep_expired(&self) -> Result<u64> {
        Ok(self.cleanup_expired() as u64)
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Carts in the LumaDB `call_carts` table
#[derive(Clone)]
pub struct LumaCartStore {
    table: KvTable,
    ttl: Duration,
}

impl LumaCartStore {
    pub async fn new(table: KvTable, ttl: Duration) -> Result<Self> {
        table.ensure_schema().await.map_err(kv_error)?;
        Ok(Self { table, ttl })
    }
}

#[async_trait]
impl CartStore for LumaCartStore {
    fn backend(&self) -> &'static str {
        "lumadb"
    }

    async fn load(&self, session_key: &SessionKey) -> Result<Cart> {
        let Some(entry) = self.table.get(session_key.as_str()).await.map_err(kv_error)? else {
            return Ok(Cart::new(session_key.clone()));
        };
        let mut cart: Cart = entry.decode().map_err(kv_error)?;
        cart.version = entry.version;
        cart.expires_at = entry.expires_at_utc();
        Ok(cart)
    }

    async fn save(&self, cart: &Cart) -> Result<Cart> {
        let mut saved = cart.clone();
        saved.expires_at = Some(Utc::now() + chrono_ttl(self.ttl));
        let value = serde_json::to_string(&saved)?;

        let version = self
            .table
            .put_if_version(cart.session_key.as_str(), &value, cart.version, Some(self.ttl))
            .await
            .map_err(kv_error)?;
        saved.version = version;

        debug!(call_id = %saved.session_key, version, "Cart saved");
        Ok(saved)
    }

    async fn sweep_expired(&self) -> Result<u64> {
        self.table.purge_expired().await.map_err(kv_error)
    }

    async fn is_healthy(&self) -> bool {
        self.table.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let store = MemoryCartStore::new(Duration::from_secs(60));
        let cart = store.load(&SessionKey::new("call_1")).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.version, 0);
    }

    #[tokio::test]
    async fn test_save_bumps_version_and_sets_expiry() {
        let store = MemoryCartStore::new(Duration::from_secs(60));
        let key = SessionKey::new("call_1");
        let cart = store.load(&key).await.unwrap();

        let saved = store.save(&cart).await.unwrap();
        assert_eq!(saved.version, 1);
        assert!(saved.expires_at.unwrap() > Utc::now());

        let again = store.save(&saved).await.unwrap();
        assert_eq!(again.version, 2);
        assert_eq!(store.load(&key).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let store = MemoryCartStore::new(Duration::from_secs(60));
        let key = SessionKey::new("call_1");
        let first = store.load(&key).await.unwrap();
        let second = store.load(&key).await.unwrap();

        store.save(&first).await.unwrap();
        let err = store.save(&second).await.unwrap_err();
        assert!(matches!(err, DialorderError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_expired_cart_starts_over() {
        let store = MemoryCartStore::new(Duration::from_secs(0));
        let key = SessionKey::new("call_1");
        let saved = store.save(&Cart::new(key.clone())).await.unwrap();
        assert_eq!(saved.version, 1);

        let reloaded = store.load(&key).await.unwrap();
        assert_eq!(reloaded.version, 0);
        // An expired row is replaced by a fresh save
        let resaved = store.save(&reloaded).await.unwrap();
        assert_eq!(resaved.version, 2);
        assert_eq!(store.sweep_expired().await.unwrap(), 1);
        assert_eq!(store.len(), 0);
    }
}
