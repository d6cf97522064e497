use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Startup configuration. Loaded from a toml file, from the environment, or
/// both (env wins). None of it affects the algorithm at runtime.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Arbitrary table merged into the default order at startup, under the
    /// same coercion rules as a debug override.
    #[serde(default)]
    pub order_defaults: Option<toml::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_token_path")]
    pub token_path: String,
    #[serde(default = "default_pricing_path")]
    pub pricing_path: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// Keep a cookie store on the transport, mirroring the browser client's
    /// credentialed mode.
    #[serde(default)]
    pub include_credentials: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_path: default_token_path(),
            pricing_path: default_pricing_path(),
            username: default_username(),
            password: default_password(),
            include_credentials: false,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_token_path() -> String {
    "/auth/token".to_string()
}

fn default_pricing_path() -> String {
    "/api/v1/orders/price-recommendation".to_string()
}

fn default_username() -> String {
    "demo@example.com".to_string()
}

fn default_password() -> String {
    "demo".to_string()
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        env_override(&mut self.gateway.base_url, "PRICEPILOT_BASE_URL");
        env_override(&mut self.gateway.token_path, "PRICEPILOT_TOKEN_PATH");
        env_override(&mut self.gateway.pricing_path, "PRICEPILOT_PRICING_PATH");
        env_override(&mut self.gateway.username, "PRICEPILOT_USERNAME");
        env_override(&mut self.gateway.password, "PRICEPILOT_PASSWORD");
        if let Ok(raw) = env::var("PRICEPILOT_INCLUDE_CREDENTIALS") {
            self.gateway.include_credentials = parse_bool(&raw);
        }
    }

    /// The order defaults as a JSON override map, ready for
    /// [`Order::apply_override`](crate::models::Order::apply_override).
    pub fn order_override(&self) -> Option<Map<String, Value>> {
        let table = self.order_defaults.as_ref()?;
        match serde_json::to_value(table) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

fn env_override(slot: &mut String, key: &str) {
    if let Ok(value) = env::var(key) {
        if !value.trim().is_empty() {
            *slot = value;
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
