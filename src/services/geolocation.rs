use std::{net::IpAddr, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

const PLACEHOLDER: &str = "N/A";
const UNKNOWN_LOCATION: &str = "Unknown";

/// Failures while resolving an address to a location.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build geolocation client")]
    ClientBuilder(#[source] reqwest::Error),
    /// The lookup request failed, timed out, or returned an error status.
    #[error("geolocation request for `{ip}` failed")]
    Request {
        ip: IpAddr,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered but could not resolve the address.
    #[error("geolocation lookup for `{ip}` was rejected: {message}")]
    Rejected { ip: IpAddr, message: String },
}

/// Location fields recorded alongside a visit, already rendered for the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoDetails {
    pub location: String,
    pub lat: String,
    pub lon: String,
    pub isp: String,
    pub timezone: String,
}

impl GeoDetails {
    /// Placeholder values used whenever a lookup fails.
    pub fn unknown() -> Self {
        Self {
            location: UNKNOWN_LOCATION.to_string(),
            lat: PLACEHOLDER.to_string(),
            lon: PLACEHOLDER.to_string(),
            isp: PLACEHOLDER.to_string(),
            timezone: PLACEHOLDER.to_string(),
        }
    }
}

/// Resolves client addresses to approximate locations.
pub trait GeoLocator: Send + Sync {
    fn locate(&self, ip: IpAddr) -> BoxFuture<'static, Result<GeoDetails, GeoError>>;
}

/// Client for an ip-api.com compatible `GET {base}/json/{ip}` endpoint.
#[derive(Clone)]
pub struct IpApiLocator {
    client: Client,
    base_url: Arc<str>,
}

impl IpApiLocator {
    /// Build a locator whose every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GeoError::ClientBuilder)?;
        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    async fn lookup(&self, ip: IpAddr) -> Result<GeoDetails, GeoError> {
        let url = format!("{}/json/{}", self.base_url, ip);
        let request_error = |source: reqwest::Error| GeoError::Request { ip, source };

        let response: IpApiResponse = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(request_error)?
            .json()
            .await
            .map_err(request_error)?;

        response.into_details(ip)
    }
}

impl GeoLocator for IpApiLocator {
    fn locate(&self, ip: IpAddr) -> BoxFuture<'static, Result<GeoDetails, GeoError>> {
        let locator = self.clone();
        Box::pin(async move { locator.lookup(ip).await })
    }
}

/// Subset of the ip-api.com response body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    city: String,
    region_name: String,
    country: String,
    lat: Value,
    lon: Value,
    isp: String,
    timezone: String,
}

impl IpApiResponse {
    fn into_details(self, ip: IpAddr) -> Result<GeoDetails, GeoError> {
        if self.status.as_deref() == Some("fail") {
            return Err(GeoError::Rejected {
                ip,
                message: self.message.unwrap_or_else(|| "unknown reason".into()),
            });
        }

        Ok(GeoDetails {
            location: format!("{}, {}, {}", self.city, self.region_name, self.country),
            lat: render_value(&self.lat),
            lon: render_value(&self.lon),
            isp: self.isp,
            timezone: self.timezone,
        })
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
