//! Core data types for trip insights

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::services::envelope::{hour_of_day, null_as_default};

/// Trip count for one hour of the day, as reported by `/api/summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    #[serde(deserialize_with = "hour_of_day")]
    pub hour: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trip_count: u64,
}

impl HourlyCount {
    /// Chart axis label, e.g. `"8:00"`.
    pub fn label(&self) -> String {
        format!("{}:00", self.hour)
    }
}

/// A named group of flat key/value rows.
///
/// No schema is assumed for the rows; the renderer prints whatever keys
/// each row carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Value>,
}

/// Hour with the most pickups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusiestHour {
    pub hour: u32,
    pub trip_count: u64,
}

/// Share of trips paid with one payment type.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentShare {
    pub payment_type: String,
    pub trip_count: u64,
    /// Full precision; round to one decimal for display.
    pub percent: f64,
}

/// One point of the fare-vs-distance scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarePoint {
    pub distance: f64,
    pub fare: f64,
}

/// Per-record chart data only the local strategy can produce: the
/// fare-vs-distance scatter and the payment-type pie.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripBreakdown {
    /// One point per record, in record order.
    pub fare_vs_distance: Vec<FarePoint>,
    pub payment_mix: Vec<PaymentShare>,
}

impl TripBreakdown {
    pub fn is_empty(&self) -> bool {
        self.fare_vs_distance.is_empty() && self.payment_mix.is_empty()
    }
}

/// Statistics derived from a non-empty record set.
///
/// Averages keep full precision; rounding happens in [`InsightSummary::to_groups`].
#[derive(Debug, Clone, PartialEq)]
pub struct InsightSummary {
    pub total_trips: usize,
    pub average_distance: f64,
    pub average_fare: f64,
    pub average_passengers: f64,
    /// `None` when no pickup timestamp could be parsed.
    pub busiest_hour: Option<BusiestHour>,
    pub longest_distance: f64,
    pub shortest_distance: f64,
    /// Starts at 0, so a set with only negative fares reports 0.
    pub highest_fare: f64,
    pub payment_distribution: Vec<PaymentShare>,
}

impl InsightSummary {
    /// Express the summary as insight groups so both insight strategies
    /// share one panel renderer.
    pub fn to_groups(&self) -> Vec<InsightGroup> {
        let busiest = self
            .busiest_hour
            .map(|busiest| format!("{}:00", busiest.hour))
            .unwrap_or_else(|| "N/A".to_string());

        let overview = InsightGroup {
            name: "Trip Insights".to_string(),
            data: vec![
                metric("Total Trips", self.total_trips.to_string()),
                metric("Average Distance", format!("{:.2} miles", self.average_distance)),
                metric("Average Fare", format!("${:.2}", self.average_fare)),
                metric("Busiest Hour", busiest),
                metric("Longest Trip", format!("{} miles", self.longest_distance)),
                metric("Shortest Trip", format!("{} miles", self.shortest_distance)),
                metric("Highest Fare", format!("${}", self.highest_fare)),
                metric("Average Passengers", format!("{:.2}", self.average_passengers)),
            ],
        };

        let payments = InsightGroup {
            name: "Payment Distribution".to_string(),
            data: self
                .payment_distribution
                .iter()
                .map(|share| {
                    let label = if share.payment_type.is_empty() {
                        "unknown"
                    } else {
                        share.payment_type.as_str()
                    };
                    json!({
                        "payment_type": label,
                        "share": format!("{:.1}%", share.percent),
                    })
                })
                .collect(),
        };

        vec![overview, payments]
    }
}

fn metric(label: &str, value: String) -> Value {
    json!({ "metric": label, "value": value })
}
