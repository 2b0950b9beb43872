use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, StatusCode, header};
use snafu::ResultExt;
use tracing::debug;

use crate::providers::{
    ApiSnafu, ClientBuildSnafu, EntityPayload, EntitySource, InvalidBaseUrlSnafu, ProviderError,
    ProviderInitError, ReqwestSnafu,
    flavordb_rest::params::{FlavorDbRestParams, entity_query},
};

/// Fetches FlavorDB entities over HTTP, one id per request, rate limited.
pub struct FlavorDbRestProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl FlavorDbRestProvider {
    /// Creates a provider for the public endpoint with default limits.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_params(FlavorDbRestParams::default())
    }

    /// Creates a provider from explicit parameters.
    pub fn with_params(params: FlavorDbRestParams) -> Result<Self, ProviderInitError> {
        let base_url = params.base_url.trim().to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return InvalidBaseUrlSnafu {
                url: base_url,
                message: "expected an http(s) URL",
            }
            .fail();
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(params.timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url,
            limiter: RateLimiter::direct(Quota::per_second(params.requests_per_second)),
        })
    }
}

#[async_trait]
impl EntitySource for FlavorDbRestProvider {
    async fn fetch_entity(&self, entity_id: u32) -> Result<EntityPayload, ProviderError> {
        self.limiter.until_ready().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(&entity_query(entity_id))
            .send()
            .await
            .context(ReqwestSnafu { entity_id })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(entity_id, "entity slot is empty upstream");
            return Ok(EntityPayload::NotFound);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                entity_id,
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .context(ReqwestSnafu { entity_id })?;
        Ok(EntityPayload::Found(body))
    }
}
