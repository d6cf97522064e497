//! Bid state machine: owns the order and the current bid, keeps local zone
//! state consistent with the backend, and serves local evaluations between
//! resyncs.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    bounds::Bounds,
    errors::GatewayError,
    gateway::PricingBackend,
    interpolate::{self, PriceEstimate},
    models::{Order, DEFAULT_START_PRICE},
    zones::ZoneModel,
};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the bid engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// Any price evaluation or proposal before the first successful resync.
    #[error("pricing data not loaded yet")]
    NotReady,
    #[error("invalid order override: {0}")]
    Override(String),
}

/// Lifecycle of the engine. `Error` is per-operation: the engine keeps its
/// last-known-good data and the next call re-enters `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

/// Outcome of one virtual-client acceptance draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceSim {
    pub accepted: bool,
    /// Uniform draw in [0, 1) compared against the acceptance probability.
    pub roll: f64,
    pub estimate: PriceEstimate,
}

struct Snapshot {
    model: ZoneModel,
    bounds: Bounds,
}

/// The bid engine. All mutating operations take `&mut self`, so resyncs
/// against one engine are serialized by construction; there is no request
/// fencing beyond that and the last response to land wins.
pub struct BidEngine<B> {
    backend: B,
    order: Order,
    snapshot: Option<Snapshot>,
    current_price: f64,
    optimal_price: f64,
    phase: Phase,
}

impl<B: PricingBackend> BidEngine<B> {
    pub fn new(backend: B) -> Self {
        Self::with_order(backend, Order::default())
    }

    pub fn with_order(backend: B, order: Order) -> Self {
        let price = order.price_start_local;
        Self {
            backend,
            order,
            snapshot: None,
            current_price: price,
            optimal_price: price,
            phase: Phase::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the first resync has succeeded.
    pub fn is_ready(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    /// Backend's recommended bid, rounded to the step.
    pub fn optimal_price(&self) -> f64 {
        self.optimal_price
    }

    pub fn bounds(&self) -> Result<Bounds> {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.bounds)
            .ok_or(EngineError::NotReady)
    }

    pub fn zone_model(&self) -> Result<&ZoneModel> {
        self.snapshot
            .as_ref()
            .map(|snapshot| &snapshot.model)
            .ok_or(EngineError::NotReady)
    }

    /// Round the proposed price to the step, clamp it into the axis, store
    /// it as the current bid and resync the backend at that price. Returns
    /// the stored price. Idempotent over its own output.
    pub async fn propose_price(&mut self, price: f64) -> Result<f64> {
        let bounds = self.bounds()?;
        let snapped = bounds.snap(price);
        debug!(requested = price, snapped, "price proposed");
        self.current_price = snapped;
        self.order.price_start_local = snapped;
        self.resync().await?;
        Ok(self.current_price)
    }

    /// Merge a partial order object into the current order (provided keys
    /// replace, others persist), re-normalize the type-sensitive fields and
    /// resync at the resulting price.
    pub async fn apply_order_override(&mut self, overrides: Map<String, Value>) -> Result<()> {
        self.order
            .apply_override(overrides)
            .map_err(|err| EngineError::Override(err.to_string()))?;

        let target = [
            self.order.price_start_local,
            self.snapshot
                .as_ref()
                .map(|snapshot| snapshot.bounds.min)
                .unwrap_or(0.0),
        ]
        .into_iter()
        .find(|candidate| *candidate != 0.0)
        .unwrap_or(DEFAULT_START_PRICE);

        self.current_price = target;
        self.order.price_start_local = target;
        self.resync().await
    }

    /// Resend the current order unchanged. Also the bootstrap call.
    pub async fn refresh(&mut self) -> Result<()> {
        self.resync().await
    }

    /// Locally evaluate a candidate price against the current zone model,
    /// without touching the backend.
    pub fn evaluate(&self, price: f64) -> Result<PriceEstimate> {
        let snapshot = self.snapshot.as_ref().ok_or(EngineError::NotReady)?;
        Ok(interpolate::evaluate(price, &snapshot.model, &snapshot.bounds))
    }

    /// Draw a virtual client decision for the given price.
    pub fn simulate_acceptance(&self, price: f64) -> Result<AcceptanceSim> {
        let estimate = self.evaluate(price)?;
        let roll = rand::random::<f64>();
        let accepted = roll <= estimate.probability / 100.0;
        info!(
            price,
            probability = estimate.probability,
            roll,
            accepted,
            "virtual client decision"
        );
        Ok(AcceptanceSim {
            accepted,
            roll,
            estimate,
        })
    }

    /// Full request/response cycle. On success the zone model and bounds are
    /// replaced atomically; on failure nothing is mutated beyond the phase.
    async fn resync(&mut self) -> Result<()> {
        self.phase = Phase::Loading;
        match self.backend.fetch_pricing(&self.order).await {
            Ok(response) => {
                let model = ZoneModel::from_response(response);
                let bounds = Bounds::compute(&model);
                self.optimal_price = bounds.round_to_step(model.optimal_price().price);
                self.current_price = bounds.clamp(self.current_price);
                info!(
                    zones = model.zones().len(),
                    min = bounds.min,
                    max = bounds.max,
                    step = bounds.step,
                    optimal = self.optimal_price,
                    "pricing data synced"
                );
                self.snapshot = Some(Snapshot { model, bounds });
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "resync failed, keeping last known pricing data");
                self.phase = Phase::Error;
                Err(err.into())
            }
        }
    }
}
