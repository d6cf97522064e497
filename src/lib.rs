//! Typed client and local bid engine for the PricePilot
//! price-recommendation API.
//!
//! The backend partitions the price axis into zones with aggregate
//! acceptance metrics; this crate turns those discrete aggregates into a
//! continuous probability/expected-value function, keeps a bid state
//! machine in sync with the backend, and handles the token lifecycle of the
//! session.

pub mod bid_engine;
pub mod bounds;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod interpolate;
pub mod models;
pub mod types;
pub mod zones;

pub use bid_engine::{AcceptanceSim, BidEngine, EngineError, Phase, Result as EngineResult};
pub use bounds::{Bounds, DEFAULT_STEP};
pub use config::{Config, GatewayConfig};
pub use errors::{GatewayError, GatewayResult};
pub use gateway::{Credentials, PricingBackend, SessionGateway};
pub use interpolate::{evaluate, PriceEstimate};
pub use models::{
    Analysis, OptimalPrice, Order, PriceProbability, PriceRange, PricingResponse, Recommendation,
    ScanRange, TokenResponse, Zone, ZoneMetrics,
};
pub use types::ZoneId;
pub use zones::{ZoneColor, ZoneModel};
