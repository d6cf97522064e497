use crate::zones::ZoneModel;

/// Quantization step used when the analysis block does not provide one.
pub const DEFAULT_STEP: f64 = 5.0;

/// Room left beyond the last zone so the decay region stays visible on the
/// axis: at least 100 currency units, or half the zone span.
const DECAY_MARGIN_MIN: f64 = 100.0;
const DECAY_MARGIN_FRACTION: f64 = 0.5;

/// The usable price axis: `max > min`, `step > 0`. Derived from the zone
/// model, never stored independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Bounds {
    pub fn compute(model: &ZoneModel) -> Self {
        let analysis = model.analysis();
        let step = analysis
            .price_increment
            .filter(|increment| *increment > 0.0)
            .unwrap_or(DEFAULT_STEP);

        if let (Some(first), Some(last)) = (model.first_zone(), model.last_zone()) {
            let min = first.price_range.min;
            let span = last.price_range.max - min;
            let margin = DECAY_MARGIN_MIN.max(span * DECAY_MARGIN_FRACTION);
            return Self {
                min,
                max: last.price_range.max + margin,
                step,
            };
        }

        let scan = analysis.scan_range.as_ref();
        let min = scan
            .and_then(|range| range.min)
            .or(analysis.start_price)
            .filter(|value| value.is_finite())
            .unwrap_or(0.0);
        let base = analysis.start_price.unwrap_or(min);
        let max_candidate = scan
            .and_then(|range| range.max)
            .filter(|value| value.is_finite())
            .unwrap_or(base + 200.0);
        // Strict positive span, otherwise interpolation divides by zero.
        let max = max_candidate.max(min + 1.0);

        Self { min, max, step }
    }

    pub fn clamp(&self, price: f64) -> f64 {
        price.clamp(self.min, self.max)
    }

    pub fn round_to_step(&self, price: f64) -> f64 {
        (price / self.step).round() * self.step
    }

    /// Round to the nearest step, then clamp into the axis. Idempotent.
    pub fn snap(&self, price: f64) -> f64 {
        self.clamp(self.round_to_step(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Analysis, PriceRange, PricingResponse, ScanRange, Zone, ZoneMetrics,
    };
    use crate::types::ZoneId;

    fn zone(min: f64, max: f64) -> Zone {
        Zone {
            zone_id: ZoneId::new(0),
            zone_name: "zone_0_green".to_string(),
            price_range: PriceRange { min, max },
            metrics: ZoneMetrics {
                avg_probability_percent: 50.0,
                avg_normalized_probability_percent: 50.0,
                avg_expected_value: 10.0,
            },
        }
    }

    fn model(response: PricingResponse) -> ZoneModel {
        ZoneModel::from_response(response)
    }

    #[test]
    fn test_bounds_from_zones_with_decay_margin() {
        let bounds = Bounds::compute(&model(PricingResponse {
            zones: vec![zone(100.0, 150.0), zone(150.0, 200.0)],
            analysis: Analysis {
                price_increment: Some(5.0),
                ..Default::default()
            },
            ..Default::default()
        }));
        assert_eq!(bounds.min, 100.0);
        // span 100 -> margin max(100, 50) = 100
        assert_eq!(bounds.max, 300.0);
        assert_eq!(bounds.step, 5.0);
    }

    #[test]
    fn test_wide_zone_span_uses_fractional_margin() {
        let bounds = Bounds::compute(&model(PricingResponse {
            zones: vec![zone(100.0, 500.0)],
            ..Default::default()
        }));
        assert_eq!(bounds.max, 500.0 + 200.0);
    }

    #[test]
    fn test_step_falls_back_when_increment_missing_or_zero() {
        let bounds = Bounds::compute(&model(PricingResponse {
            zones: vec![zone(100.0, 200.0)],
            analysis: Analysis {
                price_increment: Some(0.0),
                ..Default::default()
            },
            ..Default::default()
        }));
        assert_eq!(bounds.step, DEFAULT_STEP);
    }

    #[test]
    fn test_fallback_to_scan_range() {
        let bounds = Bounds::compute(&model(PricingResponse {
            analysis: Analysis {
                scan_range: Some(ScanRange {
                    min: Some(120.0),
                    max: Some(320.0),
                }),
                ..Default::default()
            },
            ..Default::default()
        }));
        assert_eq!(bounds.min, 120.0);
        assert_eq!(bounds.max, 320.0);
    }

    #[test]
    fn test_fallback_to_start_price() {
        let bounds = Bounds::compute(&model(PricingResponse {
            analysis: Analysis {
                start_price: Some(150.0),
                ..Default::default()
            },
            ..Default::default()
        }));
        assert_eq!(bounds.min, 150.0);
        assert_eq!(bounds.max, 350.0);
    }

    #[test]
    fn test_empty_payload_still_yields_positive_span() {
        let bounds = Bounds::compute(&model(PricingResponse::default()));
        assert!(bounds.max > bounds.min);
        assert!(bounds.step > 0.0);
        assert_eq!(bounds.min, 0.0);
        assert_eq!(bounds.max, 200.0);
    }

    #[test]
    fn test_degenerate_scan_range_forced_open() {
        let bounds = Bounds::compute(&model(PricingResponse {
            analysis: Analysis {
                scan_range: Some(ScanRange {
                    min: Some(100.0),
                    max: Some(100.0),
                }),
                ..Default::default()
            },
            ..Default::default()
        }));
        assert_eq!(bounds.min, 100.0);
        assert_eq!(bounds.max, 101.0);
    }

    #[test]
    fn test_snap_rounds_then_clamps() {
        let bounds = Bounds {
            min: 100.0,
            max: 300.0,
            step: 5.0,
        };
        assert_eq!(bounds.snap(163.0), 165.0);
        assert_eq!(bounds.snap(12.0), 100.0);
        assert_eq!(bounds.snap(999.0), 300.0);
        // idempotent
        assert_eq!(bounds.snap(bounds.snap(163.0)), 165.0);
    }
}
