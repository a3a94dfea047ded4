//! Render sinks.
//!
//! View models for each named UI slot, the [`RenderSink`] trait that
//! receives them, and [`DashboardSurface`], an in-memory sink that keeps
//! the latest content of every slot. Each update fully replaces the
//! previous content of its slot, so applying the same update twice is a
//! no-op.

use std::fmt;

use serde_json::Value;

use crate::dashboard::types::{Pagination, TripRecord};
use crate::error::FetchError;
use crate::insights::types::{HourlyCount, InsightGroup, TripBreakdown};

pub const NO_DATA: &str = "No data";
const BAR_WIDTH: u64 = 40;
const SCATTER_PREVIEW: usize = 10;

/// One row of the primary trips table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub trip_id: String,
    pub pickup: String,
    pub distance: String,
    pub speed: String,
    pub duration: String,
}

impl TableRow {
    pub fn from_trip(trip: &TripRecord) -> Self {
        Self {
            trip_id: trip.trip_id.clone(),
            pickup: display_time(trip),
            distance: format!("{:.2}", trip.trip_distance),
            speed: format!("{:.2}", trip.speed()),
            duration: format!("{:.2}", trip.duration_minutes()),
        }
    }
}

fn display_time(trip: &TripRecord) -> String {
    trip.pickup_local()
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| trip.pickup_datetime.clone())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TableView {
    #[default]
    Loading,
    Rows(Vec<TableRow>),
    Empty,
    /// Single-row error message, e.g. `"Error: API Error: DB unavailable"`.
    Error(String),
}

impl TableView {
    pub fn rows(trips: &[TripRecord]) -> Self {
        if trips.is_empty() {
            TableView::Empty
        } else {
            TableView::Rows(trips.iter().map(TableRow::from_trip).collect())
        }
    }

    pub fn error(err: &FetchError) -> Self {
        TableView::Error(format!("Error: {}", err))
    }
}

/// Pagination controls and counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub page_info: String,
    pub showing_count: u64,
    pub total_count: u64,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl From<&Pagination> for PaginationView {
    fn from(pagination: &Pagination) -> Self {
        Self {
            page_info: format!("Page {} of {}", pagination.page, pagination.total_pages),
            showing_count: pagination.showing_count(),
            total_count: pagination.total_trips,
            prev_enabled: pagination.has_prev,
            next_enabled: pagination.has_next,
        }
    }
}

/// Most-recent-trip card: four labelled fields plus the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTripCard {
    pub pickup_time: String,
    pub distance: String,
    pub duration: String,
    pub speed: String,
    pub trip_id: String,
}

impl RecentTripCard {
    /// `None` renders the "No data" placeholder in every field.
    pub fn from_trip(trip: Option<&TripRecord>) -> Self {
        match trip {
            Some(trip) => Self {
                pickup_time: display_time(trip),
                distance: format!("{:.2} miles", trip.trip_distance),
                duration: format!("{:.2} minutes", trip.duration_minutes()),
                speed: format!("{:.2} mph", trip.speed()),
                trip_id: format!("ID: {}", trip.trip_id),
            },
            None => Self::default(),
        }
    }
}

impl Default for RecentTripCard {
    fn default() -> Self {
        Self {
            pickup_time: NO_DATA.to_string(),
            distance: NO_DATA.to_string(),
            duration: NO_DATA.to_string(),
            speed: NO_DATA.to_string(),
            trip_id: format!("ID: {}", NO_DATA),
        }
    }
}

/// Labels and values handed to the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl ChartSeries {
    /// Bar series keyed by `"H:00"`. `None` when there is nothing to plot.
    pub fn trips_per_hour(summary: &[HourlyCount]) -> Option<Self> {
        if summary.is_empty() {
            return None;
        }

        Some(Self {
            label: "Trips per Hour".to_string(),
            labels: summary.iter().map(HourlyCount::label).collect(),
            values: summary.iter().map(|entry| entry.trip_count).collect(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChartView {
    #[default]
    Idle,
    Loading,
    Series(ChartSeries),
    /// Chart-specific placeholder, distinct from the table error.
    Failed,
}

/// Fare-vs-distance scatter and payment-type pie.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BreakdownView {
    /// Nothing to show, including strategies without per-record data.
    #[default]
    Idle,
    Loading,
    Charts(TripBreakdown),
    NoData,
    Failed,
}

impl BreakdownView {
    pub fn from_breakdown(breakdown: Option<TripBreakdown>) -> Self {
        match breakdown {
            None => BreakdownView::Idle,
            Some(breakdown) if breakdown.is_empty() => BreakdownView::NoData,
            Some(breakdown) => BreakdownView::Charts(breakdown),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightSection {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InsightsView {
    #[default]
    Idle,
    Sections(Vec<InsightSection>),
    NoData,
    Unavailable(String),
}

impl InsightsView {
    pub fn from_groups(groups: &[InsightGroup]) -> Self {
        if groups.is_empty() {
            return InsightsView::NoData;
        }

        InsightsView::Sections(
            groups
                .iter()
                .map(|group| InsightSection {
                    title: group.name.clone(),
                    lines: group.data.iter().map(row_text).collect(),
                })
                .collect(),
        )
    }
}

/// A row's values joined with `": "`, in the order the server sent them.
fn row_text(row: &Value) -> String {
    match row {
        Value::Object(fields) => fields
            .values()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(": "),
        other => value_text(other),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Content for one named UI slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotUpdate {
    Table(TableView),
    Pagination(PaginationView),
    RecentTrip(RecentTripCard),
    Chart(ChartView),
    Breakdown(BreakdownView),
    Insights(InsightsView),
}

/// Anything that can display dashboard slots.
pub trait RenderSink: Send {
    /// Replace the content of the slot named by `update`.
    fn apply(&mut self, update: SlotUpdate);
}

/// Latest content of every slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSurface {
    pub table: TableView,
    pub pagination: Option<PaginationView>,
    pub recent_trip: RecentTripCard,
    pub chart: ChartView,
    pub breakdown: BreakdownView,
    pub insights: InsightsView,
}

impl RenderSink for DashboardSurface {
    fn apply(&mut self, update: SlotUpdate) {
        match update {
            SlotUpdate::Table(table) => self.table = table,
            SlotUpdate::Pagination(pagination) => self.pagination = Some(pagination),
            SlotUpdate::RecentTrip(card) => self.recent_trip = card,
            SlotUpdate::Chart(chart) => self.chart = chart,
            SlotUpdate::Breakdown(breakdown) => self.breakdown = breakdown,
            SlotUpdate::Insights(insights) => self.insights = insights,
        }
    }
}

impl fmt::Display for DashboardSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Most Recent Trip ==")?;
        writeln!(f, "Pickup:   {}", self.recent_trip.pickup_time)?;
        writeln!(f, "Distance: {}", self.recent_trip.distance)?;
        writeln!(f, "Duration: {}", self.recent_trip.duration)?;
        writeln!(f, "Speed:    {}", self.recent_trip.speed)?;
        writeln!(f, "{}", self.recent_trip.trip_id)?;

        writeln!(f, "\n== Trips ==")?;
        match &self.table {
            TableView::Loading => writeln!(f, "Loading trips...")?,
            TableView::Empty => writeln!(f, "No trips found")?,
            TableView::Error(message) => writeln!(f, "{}", message)?,
            TableView::Rows(rows) => {
                writeln!(
                    f,
                    "{:<12} {:<20} {:>10} {:>10} {:>10}",
                    "Trip ID", "Pickup", "Miles", "MPH", "Minutes"
                )?;
                for row in rows {
                    writeln!(
                        f,
                        "{:<12} {:<20} {:>10} {:>10} {:>10}",
                        row.trip_id, row.pickup, row.distance, row.speed, row.duration
                    )?;
                }
            }
        }
        if let Some(pagination) = &self.pagination {
            writeln!(
                f,
                "Showing {} of {} | {} | prev: {} | next: {}",
                pagination.showing_count,
                pagination.total_count,
                pagination.page_info,
                if pagination.prev_enabled { "on" } else { "off" },
                if pagination.next_enabled { "on" } else { "off" },
            )?;
        }

        writeln!(f, "\n== Trips per Hour ==")?;
        match &self.chart {
            ChartView::Idle => {}
            ChartView::Loading => writeln!(f, "Loading, please wait...")?,
            ChartView::Failed => writeln!(f, "Failed to load chart")?,
            ChartView::Series(series) => {
                let max = series.values.iter().copied().max().unwrap_or(0).max(1);
                for (label, value) in series.labels.iter().zip(&series.values) {
                    let width =
                        (u128::from(*value) * u128::from(BAR_WIDTH) / u128::from(max)) as usize;
                    writeln!(f, "{:>6} {} {}", label, "#".repeat(width), value)?;
                }
            }
        }

        match &self.breakdown {
            BreakdownView::Idle => {}
            BreakdownView::Loading => {
                writeln!(f, "\n== Fare vs Distance ==")?;
                writeln!(f, "Loading, please wait...")?;
            }
            BreakdownView::Failed => {
                writeln!(f, "\n== Fare vs Distance ==")?;
                writeln!(f, "Failed to load chart")?;
            }
            BreakdownView::NoData => {
                writeln!(f, "\n== Fare vs Distance ==")?;
                writeln!(f, "No data")?;
            }
            BreakdownView::Charts(breakdown) => {
                writeln!(f, "\n== Fare vs Distance ==")?;
                writeln!(f, "{:>10} {:>10}", "Miles", "Fare ($)")?;
                for point in breakdown.fare_vs_distance.iter().take(SCATTER_PREVIEW) {
                    writeln!(f, "{:>10.2} {:>10.2}", point.distance, point.fare)?;
                }
                let hidden = breakdown.fare_vs_distance.len().saturating_sub(SCATTER_PREVIEW);
                if hidden > 0 {
                    writeln!(f, "... and {} more", hidden)?;
                }

                writeln!(f, "\n== Payment Types ==")?;
                for share in &breakdown.payment_mix {
                    writeln!(
                        f,
                        "{:>6} {} trips ({:.1}%)",
                        share.payment_type, share.trip_count, share.percent
                    )?;
                }
            }
        }

        writeln!(f, "\n== Insights ==")?;
        match &self.insights {
            InsightsView::Idle => {}
            InsightsView::NoData => writeln!(f, "No data available for insights.")?,
            InsightsView::Unavailable(reason) => writeln!(f, "Insights unavailable: {}", reason)?,
            InsightsView::Sections(sections) => {
                for section in sections {
                    writeln!(f, "{}", section.title)?;
                    for line in &section.lines {
                        writeln!(f, "  - {}", line)?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trip() -> TripRecord {
        TripRecord {
            trip_id: "T-9".to_string(),
            pickup_datetime: "2024-01-15 08:30:00".to_string(),
            dropoff_datetime: "2024-01-15 08:52:00".to_string(),
            trip_distance: 3.456,
            fare_amount: 14.5,
            passenger_count: 1,
            payment_type: "1".to_string(),
            speed_mph: None,
            trip_duration_min: Some(22.0),
        }
    }

    #[test]
    fn table_row_formats_two_decimals_and_defaults_missing_metrics() {
        let row = TableRow::from_trip(&trip());

        assert_eq!(row.trip_id, "T-9");
        assert_eq!(row.pickup, "2024-01-15 08:30:00");
        assert_eq!(row.distance, "3.46");
        assert_eq!(row.speed, "0.00");
        assert_eq!(row.duration, "22.00");
    }

    #[test]
    fn empty_trip_list_renders_empty_state_not_error() {
        assert_eq!(TableView::rows(&[]), TableView::Empty);
    }

    #[test]
    fn table_error_carries_reason() {
        let view = TableView::error(&FetchError::api("DB unavailable"));
        match view {
            TableView::Error(message) => assert!(message.contains("Error: DB unavailable")),
            other => panic!("expected error view, got {:?}", other),
        }
    }

    #[test]
    fn pagination_view_reflects_server_block() {
        let view = PaginationView::from(&Pagination {
            page: 2,
            per_page: 10,
            total_trips: 25,
            total_pages: 3,
            has_prev: true,
            has_next: true,
        });

        assert_eq!(view.page_info, "Page 2 of 3");
        assert_eq!(view.showing_count, 10);
        assert_eq!(view.total_count, 25);
        assert!(view.prev_enabled && view.next_enabled);
    }

    #[test]
    fn recent_trip_card_placeholder_replaces_every_field() {
        let card = RecentTripCard::from_trip(None);

        assert_eq!(card.pickup_time, NO_DATA);
        assert_eq!(card.distance, NO_DATA);
        assert_eq!(card.duration, NO_DATA);
        assert_eq!(card.speed, NO_DATA);
        assert_eq!(card.trip_id, "ID: No data");

        let card = RecentTripCard::from_trip(Some(&trip()));
        assert_eq!(card.distance, "3.46 miles");
        assert_eq!(card.trip_id, "ID: T-9");
    }

    #[test]
    fn chart_series_uses_hour_labels() {
        let series = ChartSeries::trips_per_hour(&[
            HourlyCount { hour: 0, trip_count: 4 },
            HourlyCount { hour: 13, trip_count: 9 },
        ])
        .unwrap();

        assert_eq!(series.labels, vec!["0:00", "13:00"]);
        assert_eq!(series.values, vec![4, 9]);
        assert_eq!(ChartSeries::trips_per_hour(&[]), None);
    }

    #[test]
    fn insight_rows_join_values_and_survive_odd_shapes() {
        let groups = vec![InsightGroup {
            name: "Busiest zones".to_string(),
            data: vec![
                json!({"zone": "Midtown", "trips": 120}),
                json!({"zone": "Harlem", "extra": null, "avg_fare": 12.5}),
                json!("bare value"),
                json!({}),
            ],
        }];

        let view = InsightsView::from_groups(&groups);

        let InsightsView::Sections(sections) = view else {
            panic!("expected sections");
        };
        assert_eq!(sections[0].title, "Busiest zones");
        assert_eq!(
            sections[0].lines,
            vec!["Midtown: 120", "Harlem: : 12.5", "bare value", ""]
        );
        assert_eq!(InsightsView::from_groups(&[]), InsightsView::NoData);
    }

    #[test]
    fn oversized_counts_do_not_overflow_bars() {
        let mut surface = DashboardSurface::default();
        surface.apply(SlotUpdate::Chart(ChartView::Series(
            ChartSeries::trips_per_hour(&[
                HourlyCount { hour: 1, trip_count: u64::MAX },
                HourlyCount { hour: 2, trip_count: u64::MAX / 2 },
            ])
            .unwrap(),
        )));

        let text = surface.to_string();
        assert!(text.contains(&"#".repeat(BAR_WIDTH as usize)));
        assert!(!text.contains(&"#".repeat(BAR_WIDTH as usize + 1)));
    }

    #[test]
    fn breakdown_renders_scatter_preview_and_payment_mix() {
        use crate::insights::types::{FarePoint, PaymentShare};

        let breakdown = TripBreakdown {
            fare_vs_distance: (0..12)
                .map(|i| FarePoint {
                    distance: f64::from(i),
                    fare: 5.0 + f64::from(i),
                })
                .collect(),
            payment_mix: vec![PaymentShare {
                payment_type: "1".to_string(),
                trip_count: 12,
                percent: 100.0,
            }],
        };

        assert_eq!(BreakdownView::from_breakdown(None), BreakdownView::Idle);
        assert_eq!(
            BreakdownView::from_breakdown(Some(TripBreakdown::default())),
            BreakdownView::NoData
        );

        let mut surface = DashboardSurface::default();
        surface.apply(SlotUpdate::Breakdown(BreakdownView::from_breakdown(Some(breakdown))));

        let text = surface.to_string();
        assert!(text.contains("== Fare vs Distance =="));
        assert!(text.contains("      3.00       8.00"));
        assert!(text.contains("... and 2 more"));
        assert!(text.contains("1 12 trips (100.0%)"));
    }

    #[test]
    fn surface_replaces_slot_content() {
        let mut surface = DashboardSurface::default();
        surface.apply(SlotUpdate::Table(TableView::Loading));
        surface.apply(SlotUpdate::Table(TableView::Error("Error: boom".to_string())));
        surface.apply(SlotUpdate::Chart(ChartView::Failed));

        assert_eq!(surface.table, TableView::Error("Error: boom".to_string()));
        assert_eq!(surface.chart, ChartView::Failed);

        let text = surface.to_string();
        assert!(text.contains("Error: boom"));
        assert!(text.contains("Failed to load chart"));
    }
}
