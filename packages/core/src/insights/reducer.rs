//! Insight reducer
//!
//! Pure reductions over an in-memory record set. Nothing here touches the
//! network or the UI.

use std::collections::BTreeMap;

use crate::dashboard::types::TripRecord;
use crate::insights::{
    error::{InsightsError, InsightsResult},
    types::*,
};

pub const HOURS_PER_DAY: usize = 24;

/// Compute the full insight summary.
///
/// Returns [`InsightsError::InsufficientData`] for an empty set so no
/// averages are ever divided by zero.
pub fn summarize(records: &[TripRecord]) -> InsightsResult<InsightSummary> {
    if records.is_empty() {
        return Err(InsightsError::insufficient_data("trip summary"));
    }

    let count = records.len() as f64;
    let distances = || records.iter().map(|trip| trip.trip_distance);

    let average_distance = distances().sum::<f64>() / count;
    let average_fare = records.iter().map(|trip| trip.fare_amount).sum::<f64>() / count;
    let average_passengers = records
        .iter()
        .map(|trip| f64::from(trip.passenger_count))
        .sum::<f64>()
        / count;

    let longest_distance = distances().fold(0.0, f64::max);
    let shortest_distance = distances().fold(f64::INFINITY, f64::min);
    let highest_fare = records
        .iter()
        .map(|trip| trip.fare_amount)
        .fold(0.0, f64::max);

    Ok(InsightSummary {
        total_trips: records.len(),
        average_distance,
        average_fare,
        average_passengers,
        busiest_hour: busiest_hour(&hour_histogram(records)),
        longest_distance,
        shortest_distance,
        highest_fare,
        payment_distribution: payment_distribution(records),
    })
}

/// Pickups per local hour of day. Records with unparseable timestamps are skipped.
pub fn hour_histogram(records: &[TripRecord]) -> [u64; HOURS_PER_DAY] {
    let mut histogram = [0u64; HOURS_PER_DAY];
    for hour in records.iter().filter_map(TripRecord::pickup_hour) {
        histogram[hour as usize] += 1;
    }
    histogram
}

/// Hour with the highest count, scanning hours in ascending order.
///
/// Ties go to the earliest hour. `None` if every count is zero.
pub fn busiest_hour(histogram: &[u64; HOURS_PER_DAY]) -> Option<BusiestHour> {
    let mut best: Option<BusiestHour> = None;

    for (hour, &trip_count) in histogram.iter().enumerate() {
        if trip_count == 0 {
            continue;
        }
        if best.map_or(true, |current| trip_count > current.trip_count) {
            best = Some(BusiestHour {
                hour: hour as u32,
                trip_count,
            });
        }
    }

    best
}

/// All 24 hours for a non-empty set; empty for an empty set so the chart
/// falls back to its placeholder.
pub fn hourly_series(records: &[TripRecord]) -> Vec<HourlyCount> {
    if records.is_empty() {
        return Vec::new();
    }

    hour_histogram(records)
        .iter()
        .enumerate()
        .map(|(hour, &trip_count)| HourlyCount {
            hour: hour as u32,
            trip_count,
        })
        .collect()
}

/// Share of each distinct payment type, ordered by payment type.
pub fn payment_distribution(records: &[TripRecord]) -> Vec<PaymentShare> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for trip in records {
        *counts.entry(trip.payment_type.as_str()).or_insert(0) += 1;
    }

    let total = records.len() as f64;
    counts
        .into_iter()
        .map(|(payment_type, trip_count)| PaymentShare {
            payment_type: payment_type.to_string(),
            trip_count,
            percent: trip_count as f64 / total * 100.0,
        })
        .collect()
}

/// `(distance, fare)` for every record.
pub fn fare_vs_distance(records: &[TripRecord]) -> Vec<FarePoint> {
    records
        .iter()
        .map(|trip| FarePoint {
            distance: trip.trip_distance,
            fare: trip.fare_amount,
        })
        .collect()
}

pub fn breakdown(records: &[TripRecord]) -> TripBreakdown {
    TripBreakdown {
        fare_vs_distance: fare_vs_distance(records),
        payment_mix: payment_distribution(records),
    }
}
