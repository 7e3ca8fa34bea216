use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::GeocodeResponse;
use tracing::warn;
use url::Url;

use crate::error::{CoreError, Result};

/// A coordinate resolved to a place. `country_code` is always present: a
/// lookup that cannot produce one fails instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlace {
    pub city_name: String,
    pub country: String,
    pub country_code: String,
}

#[async_trait]
pub trait GeocodeResolver: Send + Sync {
    async fn resolve(&self, lat: f64, lng: f64) -> Result<ResolvedPlace>;
}

/// Reverse-geocoding lookup against an external HTTP service. One request
/// per call; no retries, no caching, transport-default timeout.
pub struct GeocodeClient {
    http: Client,
    endpoint: Url,
}

impl GeocodeClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl GeocodeResolver for GeocodeClient {
    async fn resolve(&self, lat: f64, lng: f64) -> Result<ResolvedPlace> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[("latitude", lat), ("longitude", lng)])
            .send()
            .await?
            .error_for_status()?;
        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|err| CoreError::Network(err.to_string()))?;

        let Some(country_code) = body.resolved_country_code() else {
            warn!(lat, lng, "reverse geocode returned no country code");
            return Err(CoreError::NotFound(
                "that does not seem to be a city; try clicking somewhere else".to_string(),
            ));
        };

        Ok(ResolvedPlace {
            city_name: body.display_name().to_string(),
            country: body.country_name.clone().unwrap_or_default(),
            country_code: country_code.to_string(),
        })
    }
}

/// Null object wired in when no resolver is configured.
pub struct MissingGeocodeResolver;

#[async_trait]
impl GeocodeResolver for MissingGeocodeResolver {
    async fn resolve(&self, lat: f64, lng: f64) -> Result<ResolvedPlace> {
        Err(CoreError::Network(format!(
            "no geocode resolver configured; cannot resolve ({lat}, {lng})"
        )))
    }
}

#[cfg(test)]
#[path = "tests/geocode_tests.rs"]
mod tests;
