//! Error types for the order webhooks
//!
//! Every error body is `{"error": message, ...remediation fields}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dialorder_cart::CartError;
use dialorder_core::DialorderError;
use serde_json::{json, Map, Value};

use crate::providers::ProviderError;

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        message: String,
        received: Option<Value>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Store(#[from] DialorderError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            received: None,
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::bad_request(format!("Missing required field: {}", field))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(err) => match err {
                CartError::ItemNotOnMenu { .. }
                | CartError::ItemNotInCart { .. }
                | CartError::EmptyCart
                | CartError::ModifierNotFound { .. } => StatusCode::NOT_FOUND,
                CartError::InvalidQuantity
                | CartError::AlreadyApplied { .. }
                | CartError::IncompleteLineItem { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Store(err) => match err {
                DialorderError::NotFound(_) => StatusCode::NOT_FOUND,
                DialorderError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = Map::new();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            body.insert("error".into(), json!("Internal server error"));
            body.insert("details".into(), json!(self.to_string()));
        } else {
            if let Self::Cart(err) = &self {
                if !err.is_caller_error() {
                    tracing::warn!(error = %err, "Cart holds stale line data");
                }
            }
            body.insert("error".into(), json!(self.to_string()));
            match &self {
                Self::BadRequest {
                    received: Some(received),
                    ..
                } => {
                    body.insert("received".into(), received.clone());
                }
                Self::Cart(CartError::ItemNotOnMenu { suggestions, .. }) => {
                    body.insert("suggestions".into(), json!(suggestions));
                }
                Self::Cart(CartError::ItemNotInCart { current_items, .. }) => {
                    body.insert("currentItems".into(), json!(current_items));
                }
                Self::Cart(CartError::ModifierNotFound { available, .. }) => {
                    body.insert("availableModifiers".into(), json!(available));
                }
                _ => {}
            }
        }

        (status, Json(Value::Object(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::missing_field("itemName").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(CartError::EmptyCart).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(CartError::InvalidQuantity).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(CartError::AlreadyApplied {
                item: "Soda".into(),
                modifier: "Ice".into()
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DialorderError::NotFound("location".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DialorderError::Conflict("cart".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(ProviderError::Api("declined".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_stale_line_response() {
        let response = ApiError::from(CartError::IncompleteLineItem {
            item: "Soda".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
