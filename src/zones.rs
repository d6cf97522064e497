use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    models::{Analysis, OptimalPrice, PriceProbability, PricingResponse, Recommendation, Zone},
    types::ZoneId,
};

/// Color classification a zone name carries. Drives rendering only, never
/// the numeric outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneColor {
    #[default]
    Green,
    Yellow,
    Red,
}

impl ZoneColor {
    /// Extract the color from an opaque tag such as "zone_1_red_low".
    pub fn from_name(name: &str) -> Self {
        if name.contains("green") {
            ZoneColor::Green
        } else if name.contains("yellow") {
            ZoneColor::Yellow
        } else if name.contains("red") {
            ZoneColor::Red
        } else {
            ZoneColor::Green
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneColor::Green => "green",
            ZoneColor::Yellow => "yellow",
            ZoneColor::Red => "red",
        }
    }
}

impl fmt::Display for ZoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized view of one pricing response: zones sorted ascending by their
/// lower price bound, plus the derived optimal price and scan analysis.
/// Replaced wholesale on every successful resync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneModel {
    zones: Vec<Zone>,
    optimal_price: OptimalPrice,
    analysis: Analysis,
    price_probabilities: HashMap<String, PriceProbability>,
    recommendations: Vec<Recommendation>,
}

impl ZoneModel {
    /// Overlapping zones are tolerated, not repaired; lookup is
    /// first-match-wins in ascending order.
    pub fn from_response(response: PricingResponse) -> Self {
        let mut zones = response.zones;
        zones.sort_by(|a, b| a.price_range.min.total_cmp(&b.price_range.min));
        Self {
            zones,
            optimal_price: response.optimal_price,
            analysis: response.analysis,
            price_probabilities: response.price_probabilities,
            recommendations: response.recommendations,
        }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn optimal_price(&self) -> &OptimalPrice {
        &self.optimal_price
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn price_probabilities(&self) -> &HashMap<String, PriceProbability> {
        &self.price_probabilities
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn first_zone(&self) -> Option<&Zone> {
        self.zones.first()
    }

    pub fn last_zone(&self) -> Option<&Zone> {
        self.zones.last()
    }

    /// First zone whose range contains `price`, with its index.
    pub fn find_zone(&self, price: f64) -> Option<(usize, &Zone)> {
        self.zones
            .iter()
            .enumerate()
            .find(|(_, zone)| price >= zone.price_range.min && price <= zone.price_range.max)
    }

    pub fn zone_by_id(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.zone_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceRange, ZoneMetrics};

    fn zone(id: i32, min: f64, max: f64, name: &str) -> Zone {
        Zone {
            zone_id: ZoneId::new(id),
            zone_name: name.to_string(),
            price_range: PriceRange { min, max },
            metrics: ZoneMetrics {
                avg_probability_percent: 50.0,
                avg_normalized_probability_percent: 50.0,
                avg_expected_value: 10.0,
            },
        }
    }

    #[test]
    fn test_zones_sorted_by_lower_bound() {
        let response = PricingResponse {
            zones: vec![
                zone(2, 200.0, 250.0, "zone_2_yellow"),
                zone(0, 100.0, 150.0, "zone_0_green"),
                zone(1, 150.0, 200.0, "zone_1_green_high"),
            ],
            ..Default::default()
        };
        let model = ZoneModel::from_response(response);
        let mins: Vec<f64> = model.zones().iter().map(|z| z.price_range.min).collect();
        assert_eq!(mins, vec![100.0, 150.0, 200.0]);
    }

    #[test]
    fn test_find_zone_first_match_wins_on_overlap() {
        let response = PricingResponse {
            zones: vec![
                zone(0, 100.0, 180.0, "zone_0_green"),
                zone(1, 150.0, 200.0, "zone_1_yellow"),
            ],
            ..Default::default()
        };
        let model = ZoneModel::from_response(response);
        let (index, found) = model.find_zone(160.0).unwrap();
        assert_eq!(index, 0);
        assert_eq!(found.zone_id, ZoneId::new(0));
    }

    #[test]
    fn test_boundary_price_matches_lower_zone() {
        let response = PricingResponse {
            zones: vec![
                zone(0, 100.0, 150.0, "zone_0_green"),
                zone(1, 150.0, 200.0, "zone_1_yellow"),
            ],
            ..Default::default()
        };
        let model = ZoneModel::from_response(response);
        let (index, _) = model.find_zone(150.0).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn test_color_extraction() {
        assert_eq!(ZoneColor::from_name("zone_3_green"), ZoneColor::Green);
        assert_eq!(ZoneColor::from_name("zone_2_yellow"), ZoneColor::Yellow);
        assert_eq!(ZoneColor::from_name("zone_1_red_low"), ZoneColor::Red);
        assert_eq!(ZoneColor::from_name("mystery"), ZoneColor::Green);
    }

    #[test]
    fn test_empty_response_is_legal() {
        let model = ZoneModel::from_response(PricingResponse::default());
        assert!(model.is_empty());
        assert!(model.find_zone(150.0).is_none());
    }
}
