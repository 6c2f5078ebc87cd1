use std::{fmt::Display, time::Duration};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::value::RawValue;
use thiserror::Error;
use tracing::{debug, warn};

pub mod directions;
pub mod distance_matrix;
pub mod geocoding;

pub const GOOGLE_MAPS_API_URL: &str = "https://maps.googleapis.com/maps/api";

#[derive(Deserialize, Serialize, JsonSchema, Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TravelMode::Driving => "driving",
                TravelMode::Walking => "walking",
                TravelMode::Bicycling => "bicycling",
                TravelMode::Transit => "transit",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum GoogleMapsError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("API returned status {status}: {message}")]
    Status { status: String, message: String },

    #[error("Incomplete response: {0}")]
    IncompleteResponse(String),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl GoogleMapsError {
    /// Errors worth retrying: transport failures, server errors and rate limiting.
    pub fn is_transient(&self) -> bool {
        match self {
            GoogleMapsError::Request(_) => true,
            GoogleMapsError::Api { status, .. } => *status >= 500 || *status == 429,
            GoogleMapsError::Status { status, .. } => {
                status == "OVER_QUERY_LIMIT" || status == "UNKNOWN_ERROR"
            }
            GoogleMapsError::IncompleteResponse(_) | GoogleMapsError::Deserialize(_) => false,
        }
    }
}

/// Every web service response carries a top-level `status` field.
pub(crate) trait ApiResponse {
    fn status(&self) -> &str;
    fn error_message(&self) -> Option<&str>;
}

pub struct GoogleMapsClientParams {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl GoogleMapsClientParams {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GOOGLE_MAPS_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
        }
    }
}

pub struct GoogleMapsClient {
    params: GoogleMapsClientParams,
    client: reqwest::Client,
}

/// Google expects `lat,lng`; points are stored as `(x = lng, y = lat)`.
pub(crate) fn format_lat_lng(point: &geo_types::Point) -> String {
    format!("{},{}", point.y(), point.x())
}

impl GoogleMapsClient {
    pub fn new(params: GoogleMapsClientParams) -> Result<Self, GoogleMapsError> {
        let client = reqwest::Client::builder().timeout(params.timeout).build()?;
        Ok(Self { params, client })
    }

    pub fn params(&self) -> &GoogleMapsClientParams {
        &self.params
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/json", self.params.base_url, endpoint)
    }

    /// One request. Returns the parsed response with its body as received.
    async fn get_once<T>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Box<RawValue>), GoogleMapsError>
    where
        T: DeserializeOwned + ApiResponse,
    {
        let response = self
            .client
            .get(url)
            .query(query)
            .query(&[("key", &self.params.api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GoogleMapsError::Api { status, message });
        }

        let body = response.text().await?;
        let parsed: T = serde_json::from_str(&body)?;

        match parsed.status() {
            "OK" | "ZERO_RESULTS" => Ok((parsed, RawValue::from_string(body)?)),
            status => Err(GoogleMapsError::Status {
                status: status.to_string(),
                message: parsed.error_message().unwrap_or_default().to_string(),
            }),
        }
    }

    /// GET `{base_url}/{endpoint}/json` once. Callers own the retry policy.
    pub(crate) async fn get_json_once<T>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, GoogleMapsError>
    where
        T: DeserializeOwned + ApiResponse,
    {
        debug!("GoogleMapsApi: GET {} (single attempt)", endpoint);

        let (parsed, _) = self.get_once(&self.endpoint_url(endpoint), query).await?;
        Ok(parsed)
    }

    /// GET `{base_url}/{endpoint}/json`, retrying transient failures up to
    /// `max_retries` times.
    pub(crate) async fn get_json<T>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, GoogleMapsError>
    where
        T: DeserializeOwned + ApiResponse,
    {
        let (parsed, _) = self.get_json_raw(endpoint, query).await?;
        Ok(parsed)
    }

    pub(crate) async fn get_json_raw<T>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<(T, Box<RawValue>), GoogleMapsError>
    where
        T: DeserializeOwned + ApiResponse,
    {
        let url = self.endpoint_url(endpoint);
        let mut attempt = 0;

        loop {
            debug!("GoogleMapsApi: GET {} (attempt {})", endpoint, attempt + 1);

            match self.get_once(&url, query).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_transient() && attempt < self.params.max_retries => {
                    attempt += 1;
                    warn!(
                        "GoogleMapsApi: {} failed ({}), retrying {}/{}",
                        endpoint, err, attempt, self.params.max_retries
                    );
                    tokio::time::sleep(self.params.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub(crate) struct TextValue {
    pub value: f64,
}
