//! Insights Provider Interface
//!
//! One interface over the two ways the dashboard can obtain its chart and
//! insight data: the server's pre-aggregated endpoints, or a reduction of
//! the full record set on the client.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::dashboard::types::{FilterCriteria, TripRecord};
use crate::error::FetchError;
use crate::insights::{
    config::InsightsSource,
    error::{InsightsError, InsightsResult},
    reducer,
    types::{HourlyCount, InsightGroup, TripBreakdown},
};
use crate::services::trips_api::TripsSource;

/// One enrichment cycle: the filters it was started with, plus the full
/// record set for strategies that need it, fetched at most once no matter
/// how many panels ask for it.
pub struct InsightsScope {
    filters: FilterCriteria,
    trip_set: OnceCell<Result<Arc<Vec<TripRecord>>, FetchError>>,
}

impl InsightsScope {
    pub fn new(filters: FilterCriteria) -> Self {
        Self {
            filters,
            trip_set: OnceCell::new(),
        }
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    async fn trip_set(&self, source: &dyn TripsSource) -> Result<Arc<Vec<TripRecord>>, FetchError> {
        self.trip_set
            .get_or_init(|| async {
                let records = source.fetch_trip_set(&self.filters).await?;
                tracing::debug!("Fetched {} trips for local insights", records.len());
                Ok(Arc::new(records))
            })
            .await
            .clone()
    }
}

/// Trait for insight providers so the orchestrator does not care where
/// the numbers come from
///
/// Each panel has its own call so a slow or failing panel never holds
/// back the others.
#[async_trait]
pub trait InsightsProvider: Send + Sync {
    /// Trips per hour for the bar chart.
    async fn hourly(&self, scope: &InsightsScope) -> InsightsResult<Vec<HourlyCount>>;

    /// Named insight groups for the insights panel.
    async fn groups(&self, scope: &InsightsScope) -> InsightsResult<Vec<InsightGroup>>;

    /// Fare-vs-distance and payment-mix charts. `None` when this strategy
    /// has no per-record data.
    async fn breakdown(&self, scope: &InsightsScope) -> InsightsResult<Option<TripBreakdown>>;

    /// Get the name of this provider for logging/debugging
    fn provider_name(&self) -> &str;
}

/// Build the provider selected by configuration.
pub fn provider_for(
    source_kind: InsightsSource,
    source: Arc<dyn TripsSource>,
) -> Arc<dyn InsightsProvider> {
    tracing::info!("Using {} insights provider", source_kind);
    match source_kind {
        InsightsSource::Remote => Arc::new(RemoteInsightsProvider::new(source)),
        InsightsSource::Local => Arc::new(LocalInsightsProvider::new(source)),
    }
}

/// Reads `/api/summary` and `/api/insights`.
pub struct RemoteInsightsProvider {
    source: Arc<dyn TripsSource>,
}

impl RemoteInsightsProvider {
    pub fn new(source: Arc<dyn TripsSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl InsightsProvider for RemoteInsightsProvider {
    async fn hourly(&self, _scope: &InsightsScope) -> InsightsResult<Vec<HourlyCount>> {
        let summary = self.source.fetch_hourly_summary().await?;

        Ok(summary
            .into_iter()
            .filter(|entry| {
                let valid = (entry.hour as usize) < reducer::HOURS_PER_DAY;
                if !valid {
                    tracing::warn!("Dropping summary row with hour {}", entry.hour);
                }
                valid
            })
            .collect())
    }

    async fn groups(&self, _scope: &InsightsScope) -> InsightsResult<Vec<InsightGroup>> {
        Ok(self.source.fetch_insights().await?)
    }

    async fn breakdown(&self, _scope: &InsightsScope) -> InsightsResult<Option<TripBreakdown>> {
        Ok(None)
    }

    fn provider_name(&self) -> &str {
        "remote"
    }
}

/// Fetches the full filtered record set and reduces it locally.
pub struct LocalInsightsProvider {
    source: Arc<dyn TripsSource>,
}

impl LocalInsightsProvider {
    pub fn new(source: Arc<dyn TripsSource>) -> Self {
        Self { source }
    }

    async fn records(&self, scope: &InsightsScope) -> InsightsResult<Arc<Vec<TripRecord>>> {
        Ok(scope.trip_set(self.source.as_ref()).await?)
    }
}

#[async_trait]
impl InsightsProvider for LocalInsightsProvider {
    async fn hourly(&self, scope: &InsightsScope) -> InsightsResult<Vec<HourlyCount>> {
        Ok(reducer::hourly_series(&self.records(scope).await?))
    }

    async fn groups(&self, scope: &InsightsScope) -> InsightsResult<Vec<InsightGroup>> {
        let records = self.records(scope).await?;
        match reducer::summarize(&records) {
            Ok(summary) => Ok(summary.to_groups()),
            Err(InsightsError::InsufficientData { .. }) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn breakdown(&self, scope: &InsightsScope) -> InsightsResult<Option<TripBreakdown>> {
        Ok(Some(reducer::breakdown(&self.records(scope).await?)))
    }

    fn provider_name(&self) -> &str {
        "local"
    }
}
