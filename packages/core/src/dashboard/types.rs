//! Core data types for the trip dashboard

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::services::envelope::{null_as_default, text_or_number};

/// Naive timestamp layouts accepted for `pickup_datetime` / `dropoff_datetime`.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A single trip as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    #[serde(deserialize_with = "text_or_number")]
    pub trip_id: String,
    pub pickup_datetime: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dropoff_datetime: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trip_distance: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fare_amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub passenger_count: u32,
    #[serde(default, deserialize_with = "text_or_number")]
    pub payment_type: String,
    #[serde(default)]
    pub speed_mph: Option<f64>,
    #[serde(default)]
    pub trip_duration_min: Option<f64>,
}

impl TripRecord {
    /// Pickup time as local wall-clock time.
    ///
    /// Timestamps with an offset are converted to the local zone; naive
    /// timestamps are already local.
    pub fn pickup_local(&self) -> Option<NaiveDateTime> {
        parse_local(&self.pickup_datetime)
    }

    /// Hour of day (0-23) of the pickup in local time.
    pub fn pickup_hour(&self) -> Option<u32> {
        self.pickup_local().map(|ts| ts.hour())
    }

    pub fn speed(&self) -> f64 {
        self.speed_mph.unwrap_or(0.0)
    }

    pub fn duration_minutes(&self) -> f64 {
        self.trip_duration_min.unwrap_or(0.0)
    }
}

fn parse_local(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local).naive_local());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

/// Server-reported pagination block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total_trips: u64,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    /// Number of rows on this page: `min(per_page, total - (page - 1) * per_page)`,
    /// never negative.
    pub fn showing_count(&self) -> u64 {
        let per_page = u64::from(self.per_page);
        let skipped = u64::from(self.page.saturating_sub(1)) * per_page;
        per_page.min(self.total_trips.saturating_sub(skipped))
    }
}

/// One page of trips plus its pagination block.
#[derive(Debug, Clone, PartialEq)]
pub struct TripsPage {
    pub trips: Vec<TripRecord>,
    pub pagination: Pagination,
}

/// Filter inputs that map onto query parameters.
///
/// Declaration order is the canonical query parameter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    Date,
    MinDistance,
    StartDate,
    EndDate,
    MaxDistance,
    MinFare,
    MaxFare,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::Date,
        FilterField::MinDistance,
        FilterField::StartDate,
        FilterField::EndDate,
        FilterField::MaxDistance,
        FilterField::MinFare,
        FilterField::MaxFare,
    ];

    pub fn param_name(self) -> &'static str {
        match self {
            FilterField::Date => "date",
            FilterField::MinDistance => "min_distance",
            FilterField::StartDate => "start_date",
            FilterField::EndDate => "end_date",
            FilterField::MaxDistance => "max_distance",
            FilterField::MinFare => "min_fare",
            FilterField::MaxFare => "max_fare",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param_name())
    }
}

impl FromStr for FilterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        FilterField::ALL
            .into_iter()
            .find(|field| field.param_name() == normalized)
            .ok_or_else(|| format!("Unknown filter: {}", s))
    }
}

/// Optional query bounds, kept as the raw text of their input controls.
///
/// `None` means unconstrained. Values are not range-checked; the server
/// owns that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date: Option<String>,
    pub min_distance: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub max_distance: Option<String>,
    pub min_fare: Option<String>,
    pub max_fare: Option<String>,
}

impl FilterCriteria {
    /// Set a field from its control value. Blank input clears the field.
    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        let value = value.into();
        let value = if value.trim().is_empty() {
            None
        } else {
            Some(value.trim().to_string())
        };
        *self.slot_mut(field) = value;
        self
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Date => self.date.as_deref(),
            FilterField::MinDistance => self.min_distance.as_deref(),
            FilterField::StartDate => self.start_date.as_deref(),
            FilterField::EndDate => self.end_date.as_deref(),
            FilterField::MaxDistance => self.max_distance.as_deref(),
            FilterField::MinFare => self.min_fare.as_deref(),
            FilterField::MaxFare => self.max_fare.as_deref(),
        }
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::Date => &mut self.date,
            FilterField::MinDistance => &mut self.min_distance,
            FilterField::StartDate => &mut self.start_date,
            FilterField::EndDate => &mut self.end_date,
            FilterField::MaxDistance => &mut self.max_distance,
            FilterField::MinFare => &mut self.min_fare,
            FilterField::MaxFare => &mut self.max_fare,
        }
    }

    /// Present fields in canonical order.
    pub fn params(&self) -> impl Iterator<Item = (FilterField, &str)> + '_ {
        FilterField::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.params().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip_json(extra: &str) -> String {
        format!(
            r#"{{"trip_id": 42, "pickup_datetime": "2024-01-15 08:30:00"{}}}"#,
            extra
        )
    }

    #[test]
    fn trip_record_tolerates_missing_and_null_fields() {
        let trip: TripRecord = serde_json::from_str(&trip_json(
            r#", "trip_distance": null, "payment_type": 1, "speed_mph": null"#,
        ))
        .unwrap();

        assert_eq!(trip.trip_id, "42");
        assert_eq!(trip.payment_type, "1");
        assert_eq!(trip.trip_distance, 0.0);
        assert_eq!(trip.speed(), 0.0);
        assert_eq!(trip.duration_minutes(), 0.0);
    }

    #[test]
    fn naive_pickup_is_taken_as_local_wall_clock() {
        let trip: TripRecord = serde_json::from_str(&trip_json("")).unwrap();
        assert_eq!(trip.pickup_hour(), Some(8));

        let trip = TripRecord {
            pickup_datetime: "2024-01-15T23:05".to_string(),
            ..trip
        };
        assert_eq!(trip.pickup_hour(), Some(23));
    }

    #[test]
    fn unparseable_pickup_has_no_hour() {
        let trip: TripRecord = serde_json::from_str(
            r#"{"trip_id": "a", "pickup_datetime": "yesterday"}"#,
        )
        .unwrap();
        assert_eq!(trip.pickup_hour(), None);
    }

    #[test]
    fn showing_count_on_middle_and_last_pages() {
        let mut pagination = Pagination {
            page: 2,
            per_page: 10,
            total_trips: 25,
            total_pages: 3,
            has_prev: true,
            has_next: true,
        };
        assert_eq!(pagination.showing_count(), 10);

        pagination.page = 3;
        assert_eq!(pagination.showing_count(), 5);

        pagination.page = 9;
        assert_eq!(pagination.showing_count(), 0);
    }

    #[test]
    fn blank_filter_values_mean_unconstrained() {
        let filters = FilterCriteria::default()
            .with(FilterField::MinFare, "  ")
            .with(FilterField::Date, "2024-01-15");

        assert_eq!(filters.min_fare, None);
        assert_eq!(
            filters.params().collect::<Vec<_>>(),
            vec![(FilterField::Date, "2024-01-15")]
        );
    }

    #[test]
    fn filter_field_parses_param_names() {
        assert_eq!("min-distance".parse::<FilterField>(), Ok(FilterField::MinDistance));
        assert_eq!("max_fare".parse::<FilterField>(), Ok(FilterField::MaxFare));
        assert!("speed".parse::<FilterField>().is_err());
    }
}
