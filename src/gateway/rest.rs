use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use super::{auth::TokenCache, PricingBackend};
use crate::{
    config::GatewayConfig,
    errors::{GatewayError, GatewayResult, ServerDetail},
    models::{Order, PricingResponse, TokenResponse},
};

/// Demo credentials sent form-encoded to the token endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Transport to the pricing backend: owns the HTTP client, the resolved
/// endpoints and the token lifecycle.
///
/// Cloneable; clones share the token cache, so a 401 seen by one clone
/// forces every clone to re-authenticate on its next call.
#[derive(Clone)]
pub struct SessionGateway {
    http: reqwest::Client,
    token_url: Url,
    pricing_url: Url,
    credentials: Credentials,
    token: TokenCache,
}

impl SessionGateway {
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let mut builder = reqwest::Client::builder();
        if config.include_credentials {
            builder = builder.cookie_store(true);
        }
        let http = builder.build()?;

        let base = Url::parse(&config.base_url)?;
        let token_url = base.join(&config.token_path)?;
        let pricing_url = base.join(&config.pricing_path)?;

        Ok(Self {
            http,
            token_url,
            pricing_url,
            credentials: Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
            },
            token: TokenCache::default(),
        })
    }

    /// Cached token, fetching a fresh one when the cache is empty.
    pub async fn token(&self) -> GatewayResult<String> {
        if let Some(token) = self.token.current().await {
            return Ok(token);
        }
        let token = self.request_token().await?;
        self.token.store(token.clone()).await;
        Ok(token)
    }

    /// Drop the cached token and fetch a fresh one immediately.
    pub async fn refresh_token(&self) -> GatewayResult<String> {
        self.token.invalidate().await;
        self.token().await
    }

    pub async fn invalidate_token(&self) {
        self.token.invalidate().await;
    }

    async fn request_token(&self) -> GatewayResult<String> {
        debug!(username = %self.credentials.username, "requesting access token");
        let form = [
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let payload: TokenResponse = response.json().await?;
        info!("access token issued");
        Ok(payload.access_token)
    }

    async fn request_pricing(&self, order: &Order) -> GatewayResult<PricingResponse> {
        let token = self.token().await?;
        debug!(price = order.price_start_local, "requesting pricing data");

        let response = self
            .http
            .post(self.pricing_url.clone())
            .bearer_auth(token)
            .json(order)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_pricing_failure(status.as_u16(), body).await);
        }

        Ok(response.json().await?)
    }

    /// On 401 the cached token is dropped before the error surfaces, so the
    /// next call re-authenticates; no retry happens within this call.
    async fn map_pricing_failure(&self, status: u16, body: String) -> GatewayError {
        if status == 401 {
            warn!("pricing endpoint rejected the token, dropping it");
            self.token.invalidate().await;
            return GatewayError::Unauthorized { body };
        }
        let message = serde_json::from_str::<ServerDetail>(&body)
            .map(|parsed| parsed.detail)
            .unwrap_or(body);
        GatewayError::Pricing { status, message }
    }
}

#[async_trait]
impl PricingBackend for SessionGateway {
    async fn fetch_pricing(&self, order: &Order) -> GatewayResult<PricingResponse> {
        self.request_pricing(order).await
    }
}
