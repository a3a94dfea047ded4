//! Fetch orchestrator.
//!
//! Drives one load cycle: loading state, bounded fetch of the trips page,
//! envelope validation, table and pagination render, and (on page 1 only)
//! the enrichment fetches for the most-recent-trip card, the hourly chart,
//! the fare/payment breakdown and the insights panel.
//!
//! Every primary load takes a sequence number. Renders from a load whose
//! number is no longer the latest are dropped, so overlapping requests
//! can resolve in any order and the most recently issued one still wins.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::dashboard::render::{
    BreakdownView, ChartSeries, ChartView, InsightsView, PaginationView, RecentTripCard,
    RenderSink, SlotUpdate, TableView,
};
use crate::dashboard::request::{RequestDescriptor, DEFAULT_PER_PAGE};
use crate::dashboard::session::SessionState;
use crate::dashboard::types::{FilterCriteria, Pagination};
use crate::error::FetchError;
use crate::insights::provider::{InsightsProvider, InsightsScope};
use crate::services::trips_api::TripsSource;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables for a [`Dashboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Bound on every fetch. The primary fetch is abandoned when it elapses.
    pub request_timeout: Duration,
    /// Page size used by the initial load.
    pub per_page: u32,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Result of a primary load, as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(Pagination),
    /// Valid response with zero trips. Not an error.
    Empty(Pagination),
    /// The table shows this error.
    Failed(FetchError),
    /// A newer load started before this one finished; nothing was rendered.
    Superseded,
}

/// Render target plus the slots an enrichment cycle has put into a
/// loading state and not yet settled.
struct Surface<S> {
    sink: S,
    chart_loading: bool,
    breakdown_loading: bool,
}

impl<S: RenderSink> Surface<S> {
    fn apply(&mut self, update: SlotUpdate) {
        match &update {
            SlotUpdate::Chart(chart) => self.chart_loading = *chart == ChartView::Loading,
            SlotUpdate::Breakdown(breakdown) => {
                self.breakdown_loading = *breakdown == BreakdownView::Loading
            }
            _ => {}
        }
        self.sink.apply(update);
    }

    /// Clear loading placeholders whose enrichment cycle was superseded.
    fn settle_loading(&mut self) {
        if self.chart_loading {
            self.apply(SlotUpdate::Chart(ChartView::Idle));
        }
        if self.breakdown_loading {
            self.apply(SlotUpdate::Breakdown(BreakdownView::Idle));
        }
    }
}

/// Session-scoped dashboard: owns the UI state and the render surface.
pub struct Dashboard<S: RenderSink> {
    source: Arc<dyn TripsSource>,
    insights: Arc<dyn InsightsProvider>,
    surface: Mutex<Surface<S>>,
    session: RwLock<SessionState>,
    generation: AtomicU64,
    request_timeout: Duration,
}

impl<S: RenderSink> Dashboard<S> {
    pub fn new(
        source: Arc<dyn TripsSource>,
        insights: Arc<dyn InsightsProvider>,
        surface: S,
        options: DashboardOptions,
    ) -> Self {
        Self {
            source,
            insights,
            surface: Mutex::new(Surface {
                sink: surface,
                chart_loading: false,
                breakdown_loading: false,
            }),
            session: RwLock::new(SessionState::new(options.per_page)),
            generation: AtomicU64::new(0),
            request_timeout: options.request_timeout,
        }
    }

    /// Snapshot of the current UI state.
    pub async fn session(&self) -> SessionState {
        self.session.read().await.clone()
    }

    /// Read the render surface.
    pub async fn with_surface<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        let surface = self.surface.lock().await;
        read(&surface.sink)
    }

    /// Load one page of trips and render it.
    ///
    /// The attempted `page`, `per_page` and `filters` become the current
    /// session state before any I/O, whether or not the fetch succeeds.
    /// Errors are rendered into the table; this never fails.
    pub async fn load_page(&self, page: u32, per_page: u32, filters: FilterCriteria) -> LoadOutcome {
        let seq = self.begin_request(page, per_page, &filters).await;

        {
            let mut surface = self.surface.lock().await;
            if !self.is_current(seq) {
                return LoadOutcome::Superseded;
            }
            surface.settle_loading();
            surface.apply(SlotUpdate::Table(TableView::Loading));
        }

        let request = RequestDescriptor::trips_page(page, per_page, &filters);
        tracing::debug!("Loading trips page {} (request #{})", page, seq);

        let trips_page = match self.bounded(self.source.fetch_trips(&request)).await {
            Ok(trips_page) => trips_page,
            Err(err) => {
                tracing::warn!("Trips request #{} failed: {}", seq, err);
                return if self.render(seq, [SlotUpdate::Table(TableView::error(&err))]).await {
                    LoadOutcome::Failed(err)
                } else {
                    LoadOutcome::Superseded
                };
            }
        };

        let pagination = trips_page.pagination;
        let rendered = self
            .render(
                seq,
                [
                    SlotUpdate::Pagination(PaginationView::from(&pagination)),
                    SlotUpdate::Table(TableView::rows(&trips_page.trips)),
                ],
            )
            .await;
        if !rendered {
            return LoadOutcome::Superseded;
        }
        self.record_pagination(seq, pagination).await;

        tracing::info!(
            "Rendered {} trips (page {} of {})",
            trips_page.trips.len(),
            pagination.page,
            pagination.total_pages
        );

        if page == 1 {
            self.enrich(seq, &filters).await;
        }

        if trips_page.trips.is_empty() {
            LoadOutcome::Empty(pagination)
        } else {
            LoadOutcome::Loaded(pagination)
        }
    }

    /// First-page enrichment. The card and each panel fetch concurrently,
    /// are bounded separately, and render as soon as their own data is in.
    async fn enrich(&self, seq: u64, filters: &FilterCriteria) {
        let scope = InsightsScope::new(filters.clone());
        let provider = self.insights.provider_name();

        let recent_trip = async {
            let card = match self
                .bounded(self.source.fetch_trips(&RequestDescriptor::most_recent_trip()))
                .await
            {
                Ok(trips_page) => RecentTripCard::from_trip(trips_page.trips.first()),
                Err(err) => {
                    tracing::warn!("Most recent trip request failed: {}", err);
                    RecentTripCard::from_trip(None)
                }
            };
            self.render(seq, [SlotUpdate::RecentTrip(card)]).await;
        };

        let chart = async {
            if !self.render(seq, [SlotUpdate::Chart(ChartView::Loading)]).await {
                return;
            }
            let view = match self.bounded(self.insights.hourly(&scope)).await {
                Ok(summary) => ChartSeries::trips_per_hour(&summary)
                    .map(ChartView::Series)
                    .unwrap_or(ChartView::Failed),
                Err(err) => {
                    tracing::warn!("{} hourly summary failed: {}", provider, err);
                    ChartView::Failed
                }
            };
            self.render(seq, [SlotUpdate::Chart(view)]).await;
        };

        let breakdown = async {
            if !self.render(seq, [SlotUpdate::Breakdown(BreakdownView::Loading)]).await {
                return;
            }
            let view = match self.bounded(self.insights.breakdown(&scope)).await {
                Ok(breakdown) => BreakdownView::from_breakdown(breakdown),
                Err(err) => {
                    tracing::warn!("{} trip breakdown failed: {}", provider, err);
                    BreakdownView::Failed
                }
            };
            self.render(seq, [SlotUpdate::Breakdown(view)]).await;
        };

        let panel = async {
            let view = match self.bounded(self.insights.groups(&scope)).await {
                Ok(groups) => InsightsView::from_groups(&groups),
                Err(err) => {
                    tracing::warn!("{} insights failed: {}", provider, err);
                    InsightsView::Unavailable(err.to_string())
                }
            };
            self.render(seq, [SlotUpdate::Insights(view)]).await;
        };

        tokio::join!(recent_trip, chart, breakdown, panel);
    }

    /// Take a new sequence number and overwrite the session triple.
    async fn begin_request(&self, page: u32, per_page: u32, filters: &FilterCriteria) -> u64 {
        let mut session = self.session.write().await;
        let seq = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        session.page = page;
        session.per_page = per_page;
        session.filters = filters.clone();

        seq
    }

    async fn record_pagination(&self, seq: u64, pagination: Pagination) {
        let mut session = self.session.write().await;
        if self.is_current(seq) {
            session.last_pagination = Some(pagination);
        }
    }

    fn is_current(&self, seq: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == seq
    }

    /// Apply `updates` if `seq` is still the latest request. Returns
    /// whether anything was rendered.
    async fn render(&self, seq: u64, updates: impl IntoIterator<Item = SlotUpdate>) -> bool {
        let mut surface = self.surface.lock().await;
        if !self.is_current(seq) {
            tracing::debug!("Discarding stale response for request #{}", seq);
            return false;
        }

        for update in updates {
            surface.apply(update);
        }
        true
    }

    async fn bounded<T, E>(&self, request: impl Future<Output = Result<T, E>>) -> Result<T, E>
    where
        E: From<FetchError>,
    {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(E::from(FetchError::Timeout {
                seconds: self.request_timeout.as_secs(),
            })),
        }
    }
}
