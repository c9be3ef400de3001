//! Order Webhooks Microservice
//!
//! Webhooks behind a voice agent that takes restaurant orders by phone:
//! - Per-call carts with menu resolution and modifiers
//! - Checkout through Square hosted payment links
//! - SMS receipts through TextBelt
//! - Inbound-call variables (menu, opening hours) for the agent

mod config;
mod error;
mod handlers;
mod hours;
mod infrastructure;
mod notifier;
mod payload;
mod providers;
mod routes;

use dialorder_core::{DialorderService, HealthStatus, MicroserviceRuntime, ReadinessStatus, Result};
use dialorder_kv::{KvPool, KvTable, PoolConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::{AppConfig, StoreBackend};

use infrastructure::{
    cart_store, catalog_store, CartStore, CatalogSeed, CatalogSource, LumaCartStore, LumaCatalogSource,
    MemoryCartStore, MemoryCatalogSource,
};
use providers::{Notifier, PaymentLinkProvider, SquarePaymentLinks, TextBeltNotifier};

const CART_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub carts: Arc<dyn CartStore>,
    pub catalog: Arc<dyn CatalogSource>,
    pub payments: Arc<dyn PaymentLinkProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<AppConfig>,
    pub started_at: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dialorder_telemetry::init("order-webhooks")?;

    info!("Starting Order Webhooks microservice");

    let config = AppConfig::from_env()?;
    info!(?config, "Configuration loaded");

    let service = Arc::new(OrderWebhooksService::new(config).await?);
    MicroserviceRuntime::run(service).await?;

    Ok(())
}

pub struct OrderWebhooksService {
    state: AppState,
}

impl OrderWebhooksService {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let (carts, catalog): (Arc<dyn CartStore>, Arc<dyn CatalogSource>) = match config.store_backend {
            StoreBackend::Memory => {
                (
                    Arc::new(MemoryCartStore::new(config.cart_ttl)),
                    Arc::new(MemoryCatalogSource::new()),
                )
            }
            StoreBackend::LumaDb => {
                let pool = KvPool::new(PoolConfig::from_env()).await?;
                let carts = LumaCartStore::new(
                    KvTable::new(pool.clone(), cart_store::CART_TABLE)?,
                    config.cart_ttl,
                )
                .await?;
                let catalog = LumaCatalogSource::new(
                    KvTable::new(pool.clone(), catalog_store::LOCATION_TABLE)?,
                    KvTable::new(pool, catalog_store::CATALOG_TABLE)?,
                )
                .await?;
                (Arc::new(carts), Arc::new(catalog))
            }
        };

        if let Some(path) = &config.catalog_seed_path {
            let loaded = CatalogSeed::from_file(path)?.publish_to(catalog.as_ref()).await?;
            info!(path = %path, locations = loaded, "Catalog seed loaded");
        } else if config.store_backend == StoreBackend::Memory {
            warn!("Memory backend without CATALOG_SEED_PATH: every location lookup will fail");
        }

        let payments = SquarePaymentLinks::new(config.square.clone());
        if !payments.is_configured() {
            warn!("SQUARE_ACCESS_TOKEN not set; checkout will fail");
        }
        let notifier = TextBeltNotifier::new(config.textbelt.clone());

        Ok(Self {
            state: AppState {
                carts,
                catalog,
                payments: Arc::new(payments),
                notifier: Arc::new(notifier),
                config: Arc::new(config),
                started_at: Instant::now(),
            },
        })
    }
}

#[async_trait::async_trait]
impl DialorderService for OrderWebhooksService {
    fn service_id(&self) -> &'static str {
        "order-webhooks"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.state.started_at.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        handlers::readiness(&self.state).await
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Order Webhooks");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        let carts = self.state.carts.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CART_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                match carts.sweep_expired().await {
                    Ok(0) => {}
                    Ok(removed) => info!(removed, backend = carts.backend(), "Expired carts swept"),
                    Err(e) => warn!(error = %e, "Cart sweep failed"),
                }
            }
        });

        let bind = &self.state.config.http_bind;
        info!(bind = %bind, "Starting Order Webhooks HTTP server");

        let app = routes::create_router(self.state.clone());
        let listener = TcpListener::bind(bind).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
