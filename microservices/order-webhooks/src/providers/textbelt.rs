//! TextBelt SMS gateway

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use super::{Notifier, ProviderError, SmsMessage, SmsReceipt};
use crate::config::TextBeltConfig;

pub struct TextBeltNotifier {
    config: TextBeltConfig,
    http_client: reqwest::Client,
}

impl TextBeltNotifier {
    pub fn new(config: TextBeltConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

pub(crate) fn parse_receipt(result: &Value) -> Result<SmsReceipt, ProviderError> {
    if result["success"].as_bool() != Some(true) {
        return Err(ProviderError::Api(format!(
            "TextBelt error: {}",
            result["error"].as_str().unwrap_or("Unknown error")
        )));
    }
    Ok(SmsReceipt {
        text_id: match &result["textId"] {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        },
        quota_remaining: result["quotaRemaining"].as_i64(),
    })
}

#[async_trait]
impl Notifier for TextBeltNotifier {
    fn provider_id(&self) -> &'static str {
        "textbelt"
    }

    async fn notify(&self, message: &SmsMessage) -> Result<SmsReceipt, ProviderError> {
        let mut form = vec![
            ("phone", message.to.as_str()),
            ("message", message.body.as_str()),
            ("key", self.config.api_key.as_str()),
        ];
        if let Some(sender) = message.sender.as_deref().or(self.config.sender.as_deref()) {
            form.push(("sender", sender));
        }

        let response = self
            .http_client
            .post(&self.config.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let result: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("Failed to parse TextBelt response: {}", e)))?;

        match parse_receipt(&result) {
            Ok(receipt) => {
                info!(to = %message.to, text_id = ?receipt.text_id, "SMS sent");
                Ok(receipt)
            }
            Err(e) => {
                warn!(to = %message.to, error = %e, "SMS rejected");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_receipt() {
        let receipt = parse_receipt(&json!({"success": true, "textId": 12345, "quotaRemaining": 40})).unwrap();
        assert_eq!(receipt.text_id.as_deref(), Some("12345"));
        assert_eq!(receipt.quota_remaining, Some(40));

        let err = parse_receipt(&json!({"success": false, "error": "Out of quota"})).unwrap_err();
        assert_eq!(err.to_string(), "API error: TextBelt error: Out of quota");
    }
}
