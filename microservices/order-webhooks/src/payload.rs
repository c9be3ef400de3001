//! Webhook payload normalisation
//!
//! The phone platform posts either `{call, args: {...}}` or the same fields
//! flat at the top level, sometimes as a JSON string holding the JSON.
//! Both shapes become one [`WebhookRequest`] before any handler logic runs.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallContext {
    #[serde(default, alias = "callId")]
    pub call_id: Option<String>,
    #[serde(default, alias = "toNumber")]
    pub to_number: Option<String>,
    #[serde(default, alias = "fromNumber")]
    pub from_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderArgs {
    #[serde(default, alias = "item_name")]
    pub item_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default, alias = "special_instructions")]
    pub special_instructions: Option<String>,
    #[serde(default, alias = "quantity_to_remove")]
    pub quantity_to_remove: Option<Value>,
    #[serde(default, alias = "modifier", alias = "modifierName")]
    pub modification: Option<String>,
    #[serde(default, alias = "customer_phone")]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub total: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    pub call: CallContext,
    pub args: OrderArgs,
}

/// Parse a request body, unwrapping one level of string encoding.
pub fn decode_body(bytes: &[u8]) -> Result<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?;
    match value {
        Value::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e))),
        other => Ok(other),
    }
}

impl WebhookRequest {
    pub fn from_body(bytes: &[u8]) -> Result<Self> {
        Self::from_value(decode_body(bytes)?)
    }

    pub fn from_value(body: Value) -> Result<Self> {
        if !body.is_object() {
            return Err(ApiError::bad_request("Request body must be a JSON object"));
        }

        let args_value = match body.get("args") {
            Some(args) if args.is_object() => args.clone(),
            _ => body.clone(),
        };
        let args: OrderArgs = serde_json::from_value(args_value)
            .map_err(|e| ApiError::bad_request(format!("Invalid arguments: {}", e)))?;

        let call_value = match body.get("call") {
            Some(call) if call.is_object() => call.clone(),
            _ => body.clone(),
        };
        let call: CallContext = serde_json::from_value(call_value)
            .map_err(|e| ApiError::bad_request(format!("Invalid call details: {}", e)))?;

        Ok(Self { call, args })
    }

    pub fn call_id(&self) -> Result<&str> {
        non_empty(self.call.call_id.as_deref()).ok_or_else(|| ApiError::missing_field("call.call_id"))
    }

    pub fn to_number(&self) -> Result<&str> {
        non_empty(self.call.to_number.as_deref()).ok_or_else(|| ApiError::missing_field("call.to_number"))
    }

    pub fn from_number(&self) -> Option<&str> {
        non_empty(self.call.from_number.as_deref())
    }

    pub fn item_name(&self) -> Result<&str> {
        non_empty(self.args.item_name.as_deref()).ok_or_else(|| ApiError::missing_field("itemName"))
    }

    pub fn modification(&self) -> Result<&str> {
        non_empty(self.args.modification.as_deref()).ok_or_else(|| ApiError::missing_field("modification"))
    }

    pub fn special_instructions(&self) -> &str {
        self.args.special_instructions.as_deref().unwrap_or("").trim()
    }

    pub fn customer_phone(&self) -> Option<&str> {
        non_empty(self.args.customer_phone.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(self.args.description.as_deref())
    }

    /// Quantity to add; absent or null means 1.
    pub fn quantity(&self) -> Result<i64> {
        Ok(integer_arg(self.args.quantity.as_ref())?.unwrap_or(1))
    }

    /// Quantity to remove; absent means the whole line.
    pub fn quantity_to_remove(&self) -> Result<Option<i64>> {
        integer_arg(self.args.quantity_to_remove.as_ref())
    }

    /// Order total as text, number or string
    pub fn total(&self) -> Option<String> {
        match self.args.total.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Whole numbers only: `2`, `2.0` and `"2"` are accepted, `2.5` is not.
fn integer_arg(value: Option<&Value>) -> Result<Option<i64>> {
    let invalid = || ApiError::from(dialorder_cart::CartError::InvalidQuantity);
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                    _ => Err(invalid()),
                }
            }
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_shape() {
        let body = json!({
            "call": {"call_id": "call_1", "to_number": "+15550001111", "from_number": "+15557654321"},
            "args": {"itemName": "Soda", "quantity": 2, "specialInstructions": "no ice"}
        });
        let req = WebhookRequest::from_value(body).unwrap();
        assert_eq!(req.call_id().unwrap(), "call_1");
        assert_eq!(req.to_number().unwrap(), "+15550001111");
        assert_eq!(req.from_number(), Some("+15557654321"));
        assert_eq!(req.item_name().unwrap(), "Soda");
        assert_eq!(req.quantity().unwrap(), 2);
        assert_eq!(req.special_instructions(), "no ice");
    }

    #[test]
    fn test_flat_shape() {
        let body = json!({
            "call_id": "call_2",
            "to_number": "+15550001111",
            "item_name": "Regular Fries",
            "quantityToRemove": 1
        });
        let req = WebhookRequest::from_value(body).unwrap();
        assert_eq!(req.call_id().unwrap(), "call_2");
        assert_eq!(req.item_name().unwrap(), "Regular Fries");
        assert_eq!(req.quantity().unwrap(), 1);
        assert_eq!(req.quantity_to_remove().unwrap(), Some(1));
    }

    #[test]
    fn test_double_encoded_body() {
        let inner = json!({"call": {"call_id": "c"}, "args": {"itemName": "Soda"}}).to_string();
        let outer = serde_json::to_vec(&Value::String(inner)).unwrap();
        let req = WebhookRequest::from_body(&outer).unwrap();
        assert_eq!(req.item_name().unwrap(), "Soda");
    }

    #[test]
    fn test_quantity_forms() {
        assert_eq!(integer_arg(Some(&json!(3))).unwrap(), Some(3));
        assert_eq!(integer_arg(Some(&json!(3.0))).unwrap(), Some(3));
        assert_eq!(integer_arg(Some(&json!("4"))).unwrap(), Some(4));
        assert_eq!(integer_arg(Some(&Value::Null)).unwrap(), None);
        assert!(integer_arg(Some(&json!(2.5))).is_err());
        assert!(integer_arg(Some(&json!("two"))).is_err());
        assert!(integer_arg(Some(&json!([1]))).is_err());
    }

    #[test]
    fn test_missing_fields() {
        let req = WebhookRequest::from_value(json!({"args": {}})).unwrap();
        assert!(req.call_id().is_err());
        assert!(req.item_name().is_err());
        assert!(WebhookRequest::from_value(json!([1, 2])).is_err());
        assert!(WebhookRequest::from_body(b"not json").is_err());
    }

    #[test]
    fn test_total_forms() {
        let req = WebhookRequest::from_value(json!({"total": 25.5})).unwrap();
        assert_eq!(req.total().as_deref(), Some("25.5"));
        let req = WebhookRequest::from_value(json!({"args": {"total": "$12.00"}})).unwrap();
        assert_eq!(req.total().as_deref(), Some("$12.00"));
    }
}
