//! Catalog Source - locations by phone number and their catalogs
//!
//! Catalog data is read on every request; nothing here caches it beyond
//! the backing store itself.

use async_trait::async_trait;
use dashmap::DashMap;
use dialorder_cart::{Catalog, CatalogItem, Location};
use dialorder_core::{DialorderError, LocationId, PhoneNumber, Result};
use dialorder_kv::KvTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::kv_error;

pub const LOCATION_TABLE: &str = "phone_number_locations";
pub const CATALOG_TABLE: &str = "location_catalogs";

#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn backend(&self) -> &'static str;

    /// Location for the number the caller dialled. Unmapped numbers are
    /// `NotFound`; there is no fallback location.
    async fn get_location(&self, phone: &PhoneNumber) -> Result<Location>;

    async fn get_catalog(&self, location_id: &LocationId) -> Result<Catalog>;

    /// Replace a location and its catalog
    async fn publish(&self, location: Location, catalog: Catalog) -> Result<()>;

    async fn is_healthy(&self) -> bool;
}

/// Seed file layout: one entry per location with its items inline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    pub locations: Vec<SeedLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedLocation {
    #[serde(flatten)]
    pub location: Location,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

impl CatalogSeed {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DialorderError::Config(format!("Cannot read catalog seed {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Publish every location in the seed; returns how many were loaded.
    pub async fn publish_to(self, source: &dyn CatalogSource) -> Result<usize> {
        let count = self.locations.len();
        for seed in self.locations {
            let catalog = Catalog::new(seed.location.location_id.clone(), seed.items);
            info!(
                location_id = %seed.location.location_id,
                phone = %seed.location.phone_number,
                items = catalog.len(),
                "Publishing catalog"
            );
            source.publish(seed.location, catalog).await?;
        }
        Ok(count)
    }
}

fn location_not_found(phone: &PhoneNumber) -> DialorderError {
    DialorderError::NotFound(format!("No location found for phone number: {}", phone))
}

fn catalog_not_found(location_id: &LocationId) -> DialorderError {
    DialorderError::NotFound(format!("No menu found for location {}", location_id))
}

#[derive(Clone, Default)]
pub struct MemoryCatalogSource {
    locations: Arc<DashMap<PhoneNumber, Location>>,
    catalogs: Arc<DashMap<LocationId, Catalog>>,
}

impl MemoryCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalogSource {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get_location(&self, phone: &PhoneNumber) -> Result<Location> {
        self.locations
            .get(phone)
            .map(|l| l.clone())
            .ok_or_else(|| location_not_found(phone))
    }

    async fn get_catalog(&self, location_id: &LocationId) -> Result<Catalog> {
        self.catalogs
            .get(location_id)
            .map(|c| c.clone())
            .ok_or_else(|| catalog_not_found(location_id))
    }

    async fn publish(&self, location: Location, catalog: Catalog) -> Result<()> {
        self.catalogs.insert(location.location_id.clone(), catalog);
        self.locations.insert(location.phone_number.clone(), location);
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Locations and catalogs stored as JSON documents in LumaDB
#[derive(Clone)]
pub struct LumaCatalogSource {
    locations: KvTable,
    catalogs: KvTable,
}

impl LumaCatalogSource {
    pub async fn new(locations: KvTable, catalogs: KvTable) -> Result<Self> {
        locations.ensure_schema().await.map_err(kv_error)?;
        catalogs.ensure_schema().await.map_err(kv_error)?;
        Ok(Self { locations, catalogs })
    }
}

#[async_trait]
impl CatalogSource for LumaCatalogSource {
    fn backend(&self) -> &'static str {
        "lumadb"
    }

    async fn get_location(&self, phone: &PhoneNumber) -> Result<Location> {
        let entry = self
            .locations
            .get(phone.as_str())
            .await
            .map_err(kv_error)?
            .ok_or_else(|| location_not_found(phone))?;
        entry.decode().map_err(kv_error)
    }

    async fn get_catalog(&self, location_id: &LocationId) -> Result<Catalog> {
        let entry = self
            .catalogs
            .get(location_id.as_str())
            .await
            .map_err(kv_error)?
            .ok_or_else(|| catalog_not_found(location_id))?;
        entry.decode().map_err(kv_error)
    }

    async fn publish(&self, location: Location, catalog: Catalog) -> Result<()> {
        let catalog_json = serde_json::to_string(&catalog)?;
        self.catalogs
            .put(location.location_id.as_str(), &catalog_json, None)
            .await
            .map_err(kv_error)?;
        let location_json = serde_json::to_string(&location)?;
        self.locations
            .put(location.phone_number.as_str(), &location_json, None)
            .await
            .map_err(kv_error)?;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.locations.is_healthy().await && self.catalogs.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"{
        "locations": [{
            "locationId": "LOC_1",
            "displayName": "Red Bird Chicken",
            "phoneNumber": "+15550001111",
            "items": [
                {"canonicalName": "Soda", "unitPriceMinorUnits": 249},
                {"canonicalName": "Single Sandwich", "unitPriceMinorUnits": 999, "category": "sandwiches"}
            ]
        }]
    }"#;

    #[tokio::test]
    async fn test_seed_publish_and_lookup() {
        let seed: CatalogSeed = serde_json::from_str(SEED).unwrap();
        let source = MemoryCatalogSource::new();
        assert_eq!(seed.publish_to(&source).await.unwrap(), 1);

        let phone = PhoneNumber::parse("+15550001111").unwrap();
        let location = source.get_location(&phone).await.unwrap();
        assert_eq!(location.display_name, "Red Bird Chicken");

        let catalog = source.get_catalog(&location.location_id).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("Soda").unwrap().unit_price_minor_units, Some(249));
    }

    #[tokio::test]
    async fn test_unmapped_phone_is_not_found() {
        let source = MemoryCatalogSource::new();
        let phone = PhoneNumber::parse("+15559999999").unwrap();
        let err = source.get_location(&phone).await.unwrap_err();
        assert!(matches!(err, DialorderError::NotFound(_)));
    }
}
