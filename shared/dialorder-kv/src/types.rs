//! Common Types for KV tables

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A live row of a versioned KV table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
    /// Starts at 1 on first insert and increases by one on every write.
    pub version: i64,
    /// Unix seconds; `None` means the row never expires.
    pub expires_at: Option<i64>,
}

impl KvEntry {
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> crate::Result<T> {
        Ok(serde_json::from_str(&self.value)?)
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_as_utc() {
        let entry = KvEntry {
            key: "call-1".to_string(),
            value: "{}".to_string(),
            version: 1,
            expires_at: Some(1_700_000_000),
        };
        assert_eq!(entry.expires_at_utc().unwrap().timestamp(), 1_700_000_000);

        let forever = KvEntry { expires_at: None, ..entry };
        assert!(forever.expires_at_utc().is_none());
    }

    #[test]
    fn test_decode_value() {
        let entry = KvEntry {
            key: "k".to_string(),
            value: r#"{"a":1}"#.to_string(),
            version: 3,
            expires_at: None,
        };
        let decoded: serde_json::Value = entry.decode().unwrap();
        assert_eq!(decoded["a"], 1);
    }
}
