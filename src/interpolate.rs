//! Continuous probability synthesized from discrete zone aggregates.
//!
//! Inside a zone the probability blends linearly between boundary values,
//! where a boundary value is the average of the two adjacent zones'
//! normalized probabilities. Outside the covered range the probability
//! decays linearly from 10% at the zone edge toward 2% at the axis edge.

use crate::{bounds::Bounds, models::Zone, zones::{ZoneColor, ZoneModel}};

/// Locally evaluated probability and value for one candidate price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEstimate {
    pub price: f64,
    /// Acceptance probability in percent.
    pub probability: f64,
    pub expected_value: f64,
    pub zone: ZoneColor,
}

/// Evaluate a candidate price against the current zone model without
/// touching the backend.
pub fn evaluate(price: f64, model: &ZoneModel, bounds: &Bounds) -> PriceEstimate {
    if let Some((index, zone)) = model.find_zone(price) {
        let zones = model.zones();
        let prev = index.checked_sub(1).and_then(|i| zones.get(i));
        let next = zones.get(index + 1);
        let probability = interpolate_probability(price, zone, prev, next);
        // Tied to the chosen price, not the zone's average price.
        let expected_value = (price * probability / 100.0).max(0.0);
        return PriceEstimate {
            price,
            probability,
            expected_value,
            zone: ZoneColor::from_name(&zone.zone_name),
        };
    }

    if let (Some(first), Some(last)) = (model.first_zone(), model.last_zone()) {
        if price > last.price_range.max {
            return decay_estimate(
                price,
                price - last.price_range.max,
                bounds.max - last.price_range.max,
            );
        }
        if price < first.price_range.min {
            return decay_estimate(
                price,
                first.price_range.min - price,
                first.price_range.min - bounds.min,
            );
        }
    }

    // No zones, or a price inside an inter-zone gap: trust the backend's
    // own optimal-price figures verbatim.
    let optimal = model.optimal_price();
    PriceEstimate {
        price,
        probability: first_nonzero([
            optimal.normalized_probability_percent,
            optimal.probability_percent,
        ]),
        expected_value: first_nonzero([optimal.expected_value]),
        zone: ZoneColor::Green,
    }
}

fn interpolate_probability(
    price: f64,
    zone: &Zone,
    prev: Option<&Zone>,
    next: Option<&Zone>,
) -> f64 {
    let own = zone.metrics.avg_normalized_probability_percent;
    let span = zone.price_range.max - zone.price_range.min;
    let position = (price - zone.price_range.min) / if span > 0.0 { span } else { 1.0 };

    let at_min = prev
        .map(|p| (p.metrics.avg_normalized_probability_percent + own) / 2.0)
        .unwrap_or(own);
    let at_max = next
        .map(|n| (n.metrics.avg_normalized_probability_percent + own) / 2.0)
        .unwrap_or(own);

    at_min + (at_max - at_min) * position
}

/// Linear decay from 10% at the zone boundary down to 2% at the axis edge,
/// floored at zero past it.
fn decay_estimate(price: f64, distance: f64, max_distance: f64) -> PriceEstimate {
    let ratio = if max_distance > 0.0 {
        distance / max_distance
    } else {
        1.0
    };
    let probability = (10.0 - ratio * 8.0).max(0.0);
    PriceEstimate {
        price,
        probability,
        expected_value: price * probability / 100.0,
        zone: ZoneColor::Red,
    }
}

fn first_nonzero<const N: usize>(values: [Option<f64>; N]) -> f64 {
    values
        .into_iter()
        .flatten()
        .find(|value| value.is_finite() && *value != 0.0)
        .unwrap_or(0.0)
}
