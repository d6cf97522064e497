mod auth;
mod rest;

use async_trait::async_trait;

use crate::{
    errors::GatewayResult,
    models::{Order, PricingResponse},
};

pub use rest::{Credentials, SessionGateway};

/// Seam between the bid engine and the pricing backend. Implemented by
/// [`SessionGateway`] for the real transport and by mocks in tests.
#[async_trait]
pub trait PricingBackend: Send + Sync {
    async fn fetch_pricing(&self, order: &Order) -> GatewayResult<PricingResponse>;
}

#[async_trait]
impl<B: PricingBackend + ?Sized> PricingBackend for std::sync::Arc<B> {
    async fn fetch_pricing(&self, order: &Order) -> GatewayResult<PricingResponse> {
        (**self).fetch_pricing(order).await
    }
}
