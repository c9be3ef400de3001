//! HTTP handlers for the ordering webhooks

pub mod cart;
pub mod checkout;
pub mod inbound;
pub mod menu;
pub mod order_text;

use axum::{extract::State, http::StatusCode, Json};
use dialorder_cart::{Cart, CartError, Catalog, Location};
use dialorder_core::{DependencyStatus, DialorderError, PhoneNumber, ReadinessStatus, SessionKey};
use serde::Serialize;
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store_backend: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "order-webhooks".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store_backend: state.carts.backend().to_string(),
    })
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessStatus>) {
    let status = readiness(&state).await;
    let code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// Stores must answer; an unconfigured payment provider is reported but
/// does not make the service unready, since cart calls still work.
pub async fn readiness(state: &AppState) -> ReadinessStatus {
    let carts_ok = state.carts.is_healthy().await;
    let catalog_ok = state.catalog.is_healthy().await;
    ReadinessStatus {
        ready: carts_ok && catalog_ok,
        dependencies: vec![
            DependencyStatus {
                name: format!("cart-store:{}", state.carts.backend()),
                available: carts_ok,
                latency_ms: None,
            },
            DependencyStatus {
                name: format!("catalog:{}", state.catalog.backend()),
                available: catalog_ok,
                latency_ms: None,
            },
            DependencyStatus {
                name: state.payments.provider_id().to_string(),
                available: state.payments.is_configured(),
                latency_ms: None,
            },
        ],
    }
}

/// CORS preflight; headers are added by the router layer
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub(crate) fn parse_phone(raw: &str, field: &str) -> Result<PhoneNumber> {
    PhoneNumber::parse(raw).ok_or_else(|| ApiError::missing_field(field))
}

/// Location for the dialled number and its current catalog
pub(crate) async fn load_menu(state: &AppState, to_number: &str) -> Result<(Location, Catalog)> {
    let phone = parse_phone(to_number, "call.to_number")?;
    let location = state.catalog.get_location(&phone).await.map_err(not_found_as_404)?;
    let catalog = state
        .catalog
        .get_catalog(&location.location_id)
        .await
        .map_err(not_found_as_404)?;
    Ok((location, catalog))
}

fn not_found_as_404(err: DialorderError) -> ApiError {
    match err {
        DialorderError::NotFound(message) => ApiError::NotFound(message),
        other => ApiError::Store(other),
    }
}

/// Load, change and save a cart, reloading and re-applying the change when
/// another request saved the same cart in between.
pub(crate) async fn mutate_cart<T, F>(
    state: &AppState,
    session_key: &SessionKey,
    mut change: F,
) -> Result<(Cart, T)>
where
    F: FnMut(&mut Cart) -> std::result::Result<T, CartError>,
{
    let attempts = state.config.cart_save_attempts.max(1);
    let mut attempt = 1;
    loop {
        let mut cart = state.carts.load(session_key).await?;
        let outcome = change(&mut cart)?;
        match state.carts.save(&cart).await {
            Ok(saved) => return Ok((saved, outcome)),
            Err(DialorderError::Conflict(reason)) if attempt < attempts => {
                warn!(call_id = %session_key, attempt, reason = %reason, "Cart changed concurrently, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
