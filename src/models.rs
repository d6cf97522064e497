//! Serde mirror of the pricing backend payloads.
//!
//! The backend is loose about optional fields: absent containers become
//! empty, absent numbers become `None`. All defaulting happens here so the
//! interpolation code never sees a half-shaped payload.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ZoneId;

/// Starting price used when neither the caller nor the bounds provide one.
pub const DEFAULT_START_PRICE: f64 = 180.0;

/// Pricing request payload. Mutated in place across the session; never
/// replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_timestamp: i64,
    pub distance_in_meters: i64,
    pub duration_in_seconds: i64,
    pub pickup_in_meters: i64,
    pub pickup_in_seconds: i64,
    pub driver_rating: f64,
    pub platform: String,
    pub price_start_local: f64,
    #[serde(default)]
    pub carname: String,
    #[serde(default)]
    pub carmodel: String,
    #[serde(default)]
    pub driver_reg_date: String,
    /// Fields the backend may grow before this crate does; they survive
    /// overrides and are forwarded verbatim on every request.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            order_timestamp: Utc::now().timestamp(),
            distance_in_meters: 12_000,
            duration_in_seconds: 1_600,
            pickup_in_meters: 2_000,
            pickup_in_seconds: 120,
            driver_rating: 4.8,
            platform: "android".to_string(),
            price_start_local: DEFAULT_START_PRICE,
            carname: "LADA".to_string(),
            carmodel: "GRANTA".to_string(),
            driver_reg_date: "2020-01-15".to_string(),
            extra: Map::new(),
        }
    }
}

impl Order {
    /// Shallow-merge an arbitrary override object into the order, then
    /// re-normalize the type-sensitive fields: numeric coercion for the
    /// price and the rating (numeric strings accepted, unparseable values
    /// keep the previous one), timestamp normalization, and `null` string
    /// fields becoming empty strings.
    pub fn apply_override(&mut self, overrides: Map<String, Value>) -> serde_json::Result<()> {
        let previous_price = self.price_start_local;
        let previous_rating = self.driver_rating;

        let mut merged = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in overrides {
            merged.insert(key, value);
        }

        let timestamp = normalize_timestamp(merged.get("order_timestamp"));
        merged.insert("order_timestamp".to_string(), Value::from(timestamp));
        coerce_number_field(&mut merged, "price_start_local", previous_price);
        coerce_number_field(&mut merged, "driver_rating", previous_rating);
        default_string_field(&mut merged, "carname");
        default_string_field(&mut merged, "carmodel");
        default_string_field(&mut merged, "driver_reg_date");

        *self = serde_json::from_value(Value::Object(merged))?;
        Ok(())
    }
}

/// Accept a Unix integer, an ISO-parseable date string, or nothing; anything
/// unparseable falls back to "now".
pub(crate) fn normalize_timestamp(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|v| v.floor() as i64)
            .unwrap_or_else(|| Utc::now().timestamp()),
        Some(Value::String(s)) => parse_datetime(s).unwrap_or_else(|| Utc::now().timestamp()),
        _ => Utc::now().timestamp(),
    }
}

fn parse_datetime(raw: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp())
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_number_field(map: &mut Map<String, Value>, key: &str, fallback: f64) {
    let coerced = map
        .get(key)
        .and_then(coerce_number)
        .filter(|v| v.is_finite())
        .unwrap_or(fallback);
    map.insert(key.to_string(), Value::from(coerced));
}

fn default_string_field(map: &mut Map<String, Value>, key: &str) {
    if matches!(map.get(key), None | Some(Value::Null)) {
        map.insert(key.to_string(), Value::from(""));
    }
}

/// Contiguous price interval a zone covers. `min < max` for well-formed
/// zones; degenerate intervals are tolerated by the interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Aggregate acceptance metrics for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneMetrics {
    pub avg_probability_percent: f64,
    pub avg_normalized_probability_percent: f64,
    pub avg_expected_value: f64,
}

/// One bucket of the price axis. `zone_name` is an opaque tag that encodes
/// the color classification ("zone_3_green", "zone_1_red_low", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub price_range: PriceRange,
    pub metrics: ZoneMetrics,
}

/// The backend's recommended bid and its metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimalPrice {
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub probability_percent: Option<f64>,
    #[serde(default)]
    pub normalized_probability_percent: Option<f64>,
    #[serde(default)]
    pub expected_value: Option<f64>,
    #[serde(default)]
    pub zone_id: Option<ZoneId>,
    #[serde(default)]
    pub zone_name: Option<String>,
    #[serde(default)]
    pub score: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Scan metadata attached to every pricing response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub start_price: Option<f64>,
    #[serde(default)]
    pub scan_range: Option<ScanRange>,
    #[serde(default)]
    pub price_increment: Option<f64>,
    #[serde(default)]
    pub max_probability_price: Option<f64>,
    #[serde(default)]
    pub max_probability_percent: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Per-price probability sample, keyed by price in the response map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceProbability {
    pub prob: f64,
    pub ev: f64,
    pub norm: f64,
    pub zone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub score: i32,
    pub zone: String,
    pub price_range: PriceRange,
    pub avg_probability_percent: f64,
    pub normalized_probability_percent: f64,
    pub avg_expected_value: f64,
}

/// Raw pricing response. Absent containers deserialize to empty ones, never
/// to null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingResponse {
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub optimal_price: OptimalPrice,
    #[serde(default)]
    pub analysis: Analysis,
    #[serde(default)]
    pub price_probabilities: HashMap<String, PriceProbability>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// Body returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn override_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_override_price_roundtrip() {
        let mut order = Order::default();
        order
            .apply_override(override_map(json!({ "price_start_local": 215.0 })))
            .unwrap();
        assert_eq!(order.price_start_local, 215.0);

        order
            .apply_override(override_map(json!({ "price_start_local": "230.5" })))
            .unwrap();
        assert_eq!(order.price_start_local, 230.5);
    }

    #[test]
    fn test_override_keeps_previous_price_on_garbage() {
        let mut order = Order::default();
        order
            .apply_override(override_map(json!({ "price_start_local": "not a number" })))
            .unwrap();
        assert_eq!(order.price_start_local, DEFAULT_START_PRICE);
        assert!(order.price_start_local.is_finite());
    }

    #[test]
    fn test_override_normalizes_null_strings() {
        let mut order = Order::default();
        order
            .apply_override(override_map(json!({ "carname": null, "carmodel": null })))
            .unwrap();
        assert_eq!(order.carname, "");
        assert_eq!(order.carmodel, "");
    }

    #[test]
    fn test_override_preserves_unknown_fields() {
        let mut order = Order::default();
        order
            .apply_override(override_map(json!({ "surge_multiplier": 1.4 })))
            .unwrap();
        assert_eq!(order.extra.get("surge_multiplier"), Some(&json!(1.4)));

        let serialized = serde_json::to_value(&order).unwrap();
        assert_eq!(serialized.get("surge_multiplier"), Some(&json!(1.4)));
    }

    #[test]
    fn test_timestamp_accepts_unix_and_iso() {
        assert_eq!(normalize_timestamp(Some(&json!(1_700_000_000))), 1_700_000_000);
        assert_eq!(
            normalize_timestamp(Some(&json!("2023-11-14T22:13:20Z"))),
            1_700_000_000
        );
        assert_eq!(
            normalize_timestamp(Some(&json!("2020-01-15"))),
            1_579_046_400
        );
    }

    #[test]
    fn test_timestamp_defaults_to_now() {
        let before = Utc::now().timestamp();
        let normalized = normalize_timestamp(Some(&json!("next tuesday-ish")));
        assert!(normalized >= before);
        let from_null = normalize_timestamp(Some(&Value::Null));
        assert!(from_null >= before);
    }

    #[test]
    fn test_response_defaults_missing_containers() {
        let response: PricingResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.zones.is_empty());
        assert!(response.recommendations.is_empty());
        assert!(response.price_probabilities.is_empty());
        assert_eq!(response.optimal_price.price, 0.0);
    }
}
