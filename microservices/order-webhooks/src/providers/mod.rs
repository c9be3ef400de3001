//! External providers: hosted payment links and SMS

mod square;
mod textbelt;

pub use square::SquarePaymentLinks;
pub use textbelt::TextBeltNotifier;

use async_trait::async_trait;
use dialorder_cart::ProviderOrder;
use dialorder_core::{LocationId, PhoneNumber};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Everything needed to ask the payment provider for a hosted checkout page
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub location_id: LocationId,
    pub order: ProviderOrder,
    pub description: String,
    pub reference_id: String,
    /// Unique per attempt so a retried request cannot create a second order
    pub idempotency_key: String,
    pub source_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLink {
    pub id: String,
    pub version: i64,
    pub order_id: String,
    pub url: String,
    pub long_url: Option<String>,
    pub created_at: Option<String>,
}

#[async_trait]
pub trait PaymentLinkProvider: Send + Sync {
    fn provider_id(&self) -> &'static str;
    fn is_configured(&self) -> bool;
    async fn create_payment_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct SmsMessage {
    pub to: PhoneNumber,
    pub body: String,
    pub sender: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsReceipt {
    pub text_id: Option<String>,
    pub quota_remaining: Option<i64>,
}

/// Sends SMS. Callers decide whether a failure is fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn provider_id(&self) -> &'static str;
    async fn notify(&self, message: &SmsMessage) -> Result<SmsReceipt, ProviderError>;
}
