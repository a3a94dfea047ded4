use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::dashboard::request::RequestDescriptor;
use crate::dashboard::types::{FilterCriteria, TripRecord, TripsPage};
use crate::error::FetchError;
use crate::insights::types::{HourlyCount, InsightGroup};
use crate::services::envelope::{Envelope, InsightsPayload, SummaryPayload, TripsPayload};

/// Everything the dashboard reads from the trips API.
#[async_trait]
pub trait TripsSource: Send + Sync {
    /// One page of trips. `request` comes from the request builder.
    async fn fetch_trips(&self, request: &RequestDescriptor) -> Result<TripsPage, FetchError>;

    /// Per-hour trip counts from `/api/summary`.
    async fn fetch_hourly_summary(&self) -> Result<Vec<HourlyCount>, FetchError>;

    /// Named insight groups from `/api/insights`.
    async fn fetch_insights(&self) -> Result<Vec<InsightGroup>, FetchError>;

    /// The full record set matching `filters`, from the legacy endpoints.
    async fn fetch_trip_set(&self, filters: &FilterCriteria) -> Result<Vec<TripRecord>, FetchError>;
}

#[derive(Clone)]
pub struct TripsApiClient {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl TripsApiClient {
    /// Every request made through this client is abandoned after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::network(format!("failed to build HTTP client: {}", err)))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<T, FetchError> {
        let url = request.url(&self.base_url)?;
        tracing::debug!("GET {}", url);

        let response = self.http.get(url).send().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                FetchError::network(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                FetchError::parse(err.to_string())
            }
        })
    }
}

#[async_trait]
impl TripsSource for TripsApiClient {
    async fn fetch_trips(&self, request: &RequestDescriptor) -> Result<TripsPage, FetchError> {
        self.get_json::<Envelope<TripsPayload>>(request)
            .await?
            .into_payload()?
            .into_page()
    }

    async fn fetch_hourly_summary(&self) -> Result<Vec<HourlyCount>, FetchError> {
        let payload = self
            .get_json::<Envelope<SummaryPayload>>(&RequestDescriptor::summary())
            .await?
            .into_payload()?;

        Ok(payload.summary)
    }

    async fn fetch_insights(&self) -> Result<Vec<InsightGroup>, FetchError> {
        let payload = self
            .get_json::<Envelope<InsightsPayload>>(&RequestDescriptor::insights())
            .await?
            .into_payload()?;

        Ok(payload.insights)
    }

    async fn fetch_trip_set(&self, filters: &FilterCriteria) -> Result<Vec<TripRecord>, FetchError> {
        // The legacy endpoints answer with a bare array, no envelope.
        self.get_json::<Vec<TripRecord>>(&RequestDescriptor::trip_set(filters))
            .await
    }
}
