//! Configuration for the order webhook service

use anyhow::Context;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::hours::StoreHours;

/// Where carts and catalogs live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    LumaDb,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "lumadb" | "postgres" => Ok(Self::LumaDb),
            other => anyhow::bail!("Unknown STORE_BACKEND: {}", other),
        }
    }
}

/// Square environment; selects the API host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareEnvironment {
    Sandbox,
    Production,
}

impl SquareEnvironment {
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://connect.squareupsandbox.com",
            Self::Production => "https://connect.squareup.com",
        }
    }
}

impl FromStr for SquareEnvironment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "dev" | "development" => Ok(Self::Sandbox),
            "production" | "prod" => Ok(Self::Production),
            other => anyhow::bail!("Unknown SQUARE_ENVIRONMENT: {}", other),
        }
    }
}

#[derive(Clone)]
pub struct SquareConfig {
    pub access_token: Option<String>,
    pub environment: SquareEnvironment,
    pub api_version: String,
    pub source_name: String,
    /// Overrides the environment's host; used to point at a local stub.
    pub base_url_override: Option<String>,
}

impl SquareConfig {
    pub fn base_url(&self) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }
}

impl fmt::Debug for SquareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SquareConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("environment", &self.environment)
            .field("api_version", &self.api_version)
            .field("source_name", &self.source_name)
            .field("base_url_override", &self.base_url_override)
            .finish()
    }
}

#[derive(Clone)]
pub struct TextBeltConfig {
    pub api_key: String,
    pub url: String,
    /// Sender label; the location name is used when unset.
    pub sender: Option<String>,
}

impl fmt::Debug for TextBeltConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBeltConfig")
            .field("api_key", &"<redacted>")
            .field("url", &self.url)
            .field("sender", &self.sender)
            .finish()
    }
}

/// Order webhook service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP bind address
    pub http_bind: String,
    pub store_backend: StoreBackend,
    /// JSON file of locations and catalogs loaded at startup
    pub catalog_seed_path: Option<String>,
    /// Cart expiry, refreshed on every save
    pub cart_ttl: Duration,
    /// Compare-and-swap attempts per cart change
    pub cart_save_attempts: u32,
    pub clear_cart_on_checkout: bool,
    pub square: SquareConfig,
    pub textbelt: TextBeltConfig,
    /// Link appended to order-total texts
    pub order_text_checkout_url: Option<String>,
    pub store_hours: StoreHours,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            http_bind: env_or("HTTP_BIND", "0.0.0.0:8080".to_string())?,
            store_backend: env_or("STORE_BACKEND", StoreBackend::Memory)?,
            catalog_seed_path: env_opt("CATALOG_SEED_PATH"),
            cart_ttl: Duration::from_secs(env_or("CART_TTL_SECS", 7200u64)?),
            cart_save_attempts: env_or("CART_SAVE_ATTEMPTS", 3u32)?.max(1),
            clear_cart_on_checkout: env_or("CLEAR_CART_ON_CHECKOUT", false)?,
            square: SquareConfig {
                access_token: env_opt("SQUARE_ACCESS_TOKEN"),
                environment: env_or("SQUARE_ENVIRONMENT", SquareEnvironment::Sandbox)?,
                api_version: env_or("SQUARE_API_VERSION", "2025-06-18".to_string())?,
                source_name: env_or("ORDER_SOURCE_NAME", "Voice AI Ordering".to_string())?,
                base_url_override: env_opt("SQUARE_BASE_URL"),
            },
            textbelt: TextBeltConfig {
                api_key: env_or("TEXTBELT_API_KEY", "textbelt".to_string())?,
                url: env_or("TEXTBELT_URL", "https://textbelt.com/text".to_string())?,
                sender: env_opt("SMS_SENDER"),
            },
            order_text_checkout_url: env_opt("ORDER_TEXT_CHECKOUT_URL"),
            store_hours: StoreHours {
                open_hour: env_or("STORE_OPEN_HOUR", 11)?,
                close_hour: env_or("STORE_CLOSE_HOUR", 22)?,
                sunday_close_hour: env_or("STORE_SUNDAY_CLOSE_HOUR", 21)?,
                utc_offset_hours: env_or("STORE_UTC_OFFSET_HOURS", -5)?,
                observes_us_dst: env_or("STORE_OBSERVES_US_DST", true)?,
            },
        })
    }

    /// Defaults with in-memory stores, as used by tests
    pub fn for_memory_backend() -> Self {
        Self {
            http_bind: "127.0.0.1:0".to_string(),
            store_backend: StoreBackend::Memory,
            catalog_seed_path: None,
            cart_ttl: Duration::from_secs(7200),
            cart_save_attempts: 3,
            clear_cart_on_checkout: false,
            square: SquareConfig {
                access_token: None,
                environment: SquareEnvironment::Sandbox,
                api_version: "2025-06-18".to_string(),
                source_name: "Voice AI Ordering".to_string(),
                base_url_override: None,
            },
            textbelt: TextBeltConfig {
                api_key: "textbelt".to_string(),
                url: "https://textbelt.com/text".to_string(),
                sender: None,
            },
            order_text_checkout_url: None,
            store_hours: StoreHours::default(),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env_opt(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {}", name)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("LumaDB".parse::<StoreBackend>().unwrap(), StoreBackend::LumaDb);
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_square_base_url() {
        let mut square = AppConfig::for_memory_backend().square;
        assert_eq!(square.base_url(), "https://connect.squareupsandbox.com");
        square.environment = SquareEnvironment::Production;
        assert_eq!(square.base_url(), "https://connect.squareup.com");
        square.base_url_override = Some("http://127.0.0.1:9000".to_string());
        assert_eq!(square.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_secrets_redacted() {
        let mut config = AppConfig::for_memory_backend();
        config.square.access_token = Some("EAAA-secret".to_string());
        config.textbelt.api_key = "tb-secret".to_string();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("EAAA-secret"));
        assert!(!rendered.contains("tb-secret"));
    }
}
