//! Router configuration for the ordering webhooks

use axum::{
    http::{header, HeaderValue},
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Permissive CORS on every response, errors included
async fn cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        // Cart
        .route(
            "/retell/add-to-cart",
            post(handlers::cart::add_to_cart).options(handlers::preflight),
        )
        .route(
            "/retell/remove-from-cart",
            post(handlers::cart::remove_from_cart).options(handlers::preflight),
        )
        .route(
            "/retell/add-modifier",
            post(handlers::cart::add_modifier).options(handlers::preflight),
        )
        .route(
            "/retell/cart-summary",
            post(handlers::cart::cart_summary).options(handlers::preflight),
        )
        // Order
        .route(
            "/retell/checkout",
            post(handlers::checkout::checkout).options(handlers::preflight),
        )
        .route(
            "/retell/order-text",
            post(handlers::order_text::order_text).options(handlers::preflight),
        )
        // Call setup
        .route(
            "/retell/inbound-call",
            post(handlers::inbound::inbound_call).options(handlers::preflight),
        )
        .route(
            "/menu/{phone}",
            get(handlers::menu::get_menu).options(handlers::preflight),
        )
        .layer(middleware::map_response(cors_headers))
        .with_state(state)
}
