//! In-memory `TripsSource` for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::dashboard::request::RequestDescriptor;
use crate::dashboard::types::{FilterCriteria, TripRecord, TripsPage};
use crate::error::FetchError;
use crate::insights::types::{HourlyCount, InsightGroup};
use crate::services::trips_api::TripsSource;

type PageResponse = (Duration, Result<TripsPage, FetchError>);

/// Canned responses keyed by `(page, per_page)`, with optional delays so
/// tests can overlap requests under paused tokio time.
pub struct MockTripsSource {
    pages: HashMap<(u32, u32), PageResponse>,
    summary: Result<Vec<HourlyCount>, FetchError>,
    insights: Result<Vec<InsightGroup>, FetchError>,
    trip_set: Result<Vec<TripRecord>, FetchError>,
    summary_delay: Duration,
    insights_delay: Duration,
    trip_set_delay: Duration,
    requests: Mutex<Vec<RequestDescriptor>>,
    trip_set_requests: Mutex<Vec<FilterCriteria>>,
    summary_calls: Mutex<usize>,
    insights_calls: Mutex<usize>,
}

impl MockTripsSource {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            summary: Ok(Vec::new()),
            insights: Ok(Vec::new()),
            trip_set: Ok(Vec::new()),
            summary_delay: Duration::ZERO,
            insights_delay: Duration::ZERO,
            trip_set_delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
            trip_set_requests: Mutex::new(Vec::new()),
            summary_calls: Mutex::new(0),
            insights_calls: Mutex::new(0),
        }
    }

    pub fn with_page(self, page: u32, per_page: u32, result: Result<TripsPage, FetchError>) -> Self {
        self.with_delayed_page(page, per_page, Duration::ZERO, result)
    }

    pub fn with_delayed_page(
        mut self,
        page: u32,
        per_page: u32,
        delay: Duration,
        result: Result<TripsPage, FetchError>,
    ) -> Self {
        self.pages.insert((page, per_page), (delay, result));
        self
    }

    pub fn with_summary(mut self, summary: Result<Vec<HourlyCount>, FetchError>) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_insights(mut self, insights: Result<Vec<InsightGroup>, FetchError>) -> Self {
        self.insights = insights;
        self
    }

    pub fn with_trip_set(mut self, trip_set: Result<Vec<TripRecord>, FetchError>) -> Self {
        self.trip_set = trip_set;
        self
    }

    /// Same delay on every enrichment endpoint.
    pub fn with_enrichment_delay(self, delay: Duration) -> Self {
        self.with_summary_delay(delay)
            .with_insights_delay(delay)
            .with_trip_set_delay(delay)
    }

    pub fn with_summary_delay(mut self, delay: Duration) -> Self {
        self.summary_delay = delay;
        self
    }

    pub fn with_insights_delay(mut self, delay: Duration) -> Self {
        self.insights_delay = delay;
        self
    }

    pub fn with_trip_set_delay(mut self, delay: Duration) -> Self {
        self.trip_set_delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.requests.lock().unwrap().clone()
    }

    pub fn trip_set_requests(&self) -> Vec<FilterCriteria> {
        self.trip_set_requests.lock().unwrap().clone()
    }

    pub fn summary_calls(&self) -> usize {
        *self.summary_calls.lock().unwrap()
    }

    pub fn insights_calls(&self) -> usize {
        *self.insights_calls.lock().unwrap()
    }

    async fn pause(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl TripsSource for MockTripsSource {
    async fn fetch_trips(&self, request: &RequestDescriptor) -> Result<TripsPage, FetchError> {
        self.requests.lock().unwrap().push(request.clone());

        let key = (
            request.param("page").and_then(|v| v.parse().ok()).unwrap_or(0),
            request.param("per_page").and_then(|v| v.parse().ok()).unwrap_or(0),
        );

        match self.pages.get(&key) {
            Some((delay, result)) => {
                Self::pause(*delay).await;
                result.clone()
            }
            None => Err(FetchError::Transport { status: 404 }),
        }
    }

    async fn fetch_hourly_summary(&self) -> Result<Vec<HourlyCount>, FetchError> {
        *self.summary_calls.lock().unwrap() += 1;
        Self::pause(self.summary_delay).await;
        self.summary.clone()
    }

    async fn fetch_insights(&self) -> Result<Vec<InsightGroup>, FetchError> {
        *self.insights_calls.lock().unwrap() += 1;
        Self::pause(self.insights_delay).await;
        self.insights.clone()
    }

    async fn fetch_trip_set(&self, filters: &FilterCriteria) -> Result<Vec<TripRecord>, FetchError> {
        self.trip_set_requests.lock().unwrap().push(filters.clone());
        Self::pause(self.trip_set_delay).await;
        self.trip_set.clone()
    }
}
