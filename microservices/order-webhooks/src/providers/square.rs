//! Square online-checkout payment links over the REST API

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info};

use super::{PaymentLink, PaymentLinkProvider, PaymentLinkRequest, ProviderError};
use crate::config::SquareConfig;

pub struct SquarePaymentLinks {
    config: SquareConfig,
    http_client: reqwest::Client,
}

impl SquarePaymentLinks {
    pub fn new(config: SquareConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

/// Request body for `POST /v2/online-checkout/payment-links`
pub(crate) fn payment_link_body(request: &PaymentLinkRequest) -> Value {
    let line_items: Vec<Value> = request
        .order
        .line_items
        .iter()
        .map(|item| {
            let mut line = json!({
                "name": item.name,
                "quantity": item.quantity.to_string(),
                "base_price_money": {
                    "amount": item.unit_price_minor_units,
                    "currency": item.currency,
                },
            });
            if let Some(note) = &item.note {
                line["note"] = json!(note);
            }
            line
        })
        .collect();

    json!({
        "idempotency_key": request.idempotency_key,
        "description": request.description,
        "order": {
            "location_id": request.location_id.as_str(),
            "reference_id": request.reference_id,
            "source": { "name": request.source_name },
            "line_items": line_items,
        },
    })
}

/// Pull the link out of a Square response, or the first error detail.
pub(crate) fn parse_payment_link(result: &Value) -> Result<PaymentLink, ProviderError> {
    if let Some(errors) = result["errors"].as_array().filter(|e| !e.is_empty()) {
        let detail = errors
            .iter()
            .map(|e| {
                format!(
                    "{}: {}",
                    e["code"].as_str().unwrap_or("UNKNOWN"),
                    e["detail"].as_str().unwrap_or("no detail")
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ProviderError::Api(detail));
    }

    let link = &result["payment_link"];
    if !link.is_object() {
        return Err(ProviderError::Api("Payment link not found in API response".to_string()));
    }
    Ok(PaymentLink {
        id: link["id"].as_str().unwrap_or_default().to_string(),
        version: link["version"].as_i64().unwrap_or(1),
        order_id: link["order_id"].as_str().unwrap_or_default().to_string(),
        url: link["url"].as_str().unwrap_or_default().to_string(),
        long_url: link["long_url"].as_str().map(str::to_string),
        created_at: link["created_at"].as_str().map(str::to_string),
    })
}

#[async_trait]
impl PaymentLinkProvider for SquarePaymentLinks {
    fn provider_id(&self) -> &'static str {
        "square"
    }

    fn is_configured(&self) -> bool {
        self.config.access_token.is_some()
    }

    async fn create_payment_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, ProviderError> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("SQUARE_ACCESS_TOKEN is not set".to_string()))?;

        let response = self
            .http_client
            .post(format!("{}/v2/online-checkout/payment-links", self.config.base_url()))
            .bearer_auth(token)
            .header("Square-Version", &self.config.api_version)
            .json(&payment_link_body(request))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let result: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("HTTP {}: {}", status, e)))?;

        match parse_payment_link(&result) {
            Ok(link) => {
                info!(
                    location_id = %request.location_id,
                    order_id = %link.order_id,
                    reference_id = %request.reference_id,
                    "Payment link created"
                );
                Ok(link)
            }
            Err(e) => {
                error!(status = %status, error = %e, "Square payment link request failed");
                Err(e)
            }
        }
    }
}
