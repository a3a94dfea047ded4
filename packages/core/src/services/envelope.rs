//! Response envelope shared by every `/api/*` endpoint, plus the lenient
//! field decoders used by the trip and summary types.
//!
//! Every response looks like `{ "success": bool, <payload fields>, "error"?: string }`.
//! When `success` is false nothing but `error` is trusted.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::dashboard::types::{Pagination, TripRecord, TripsPage};
use crate::error::FetchError;
use crate::insights::types::{HourlyCount, InsightGroup};

/// `{success, ..payload, error?}` wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, or turn a `success: false` envelope into an
    /// [`FetchError::Api`].
    pub fn into_payload(self) -> Result<T, FetchError> {
        if self.success {
            Ok(self.payload)
        } else {
            Err(FetchError::api(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TripsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trips: Vec<TripRecord>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl TripsPayload {
    /// Pagination totals are server-authoritative; a successful response
    /// without them is rejected rather than guessed.
    pub fn into_page(self) -> Result<TripsPage, FetchError> {
        let pagination = self
            .pagination
            .ok_or_else(|| FetchError::parse("response is missing pagination"))?;

        Ok(TripsPage {
            trips: self.trips,
            pagination,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Vec<HourlyCount>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InsightsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub insights: Vec<InsightGroup>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Accepts `"CRD"`, `1`, `1.5` or `null` and yields text.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Integer(n)) => n.to_string(),
        Some(TextOrNumber::Float(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Treats an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Hour keys come back as `8` from some backends and `"08"` from SQLite's `strftime`.
pub(crate) fn hour_of_day<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| D::Error::custom(format!("invalid hour '{}'", text))),
        TextOrNumber::Integer(n) => {
            u32::try_from(n).map_err(|_| D::Error::custom(format!("invalid hour {}", n)))
        }
        TextOrNumber::Float(n) if n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64 => {
            Ok(n as u32)
        }
        TextOrNumber::Float(n) => Err(D::Error::custom(format!("invalid hour {}", n))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_envelope_yields_api_error_and_ignores_payload() {
        let body = r#"{"success": false, "error": "DB unavailable", "trips": null}"#;
        let envelope: Envelope<TripsPayload> = serde_json::from_str(body).unwrap();

        assert_eq!(
            envelope.into_payload().unwrap_err(),
            FetchError::api("DB unavailable")
        );
    }

    #[test]
    fn failed_envelope_without_reason_still_reports_error() {
        let envelope: Envelope<SummaryPayload> =
            serde_json::from_str(r#"{"success": false}"#).unwrap();

        assert_eq!(
            envelope.into_payload().unwrap_err(),
            FetchError::api("unknown error")
        );
    }

    #[test]
    fn trips_payload_without_pagination_is_rejected() {
        let envelope: Envelope<TripsPayload> =
            serde_json::from_str(r#"{"success": true, "trips": []}"#).unwrap();
        let err = envelope.into_payload().unwrap().into_page().unwrap_err();

        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[test]
    fn summary_hours_accept_text_and_numbers() {
        let body = r#"{"success": true, "summary": [
            {"hour": "08", "trip_count": 12},
            {"hour": 17, "trip_count": 40}
        ]}"#;
        let envelope: Envelope<SummaryPayload> = serde_json::from_str(body).unwrap();
        let summary = envelope.into_payload().unwrap().summary;

        assert_eq!(summary[0].hour, 8);
        assert_eq!(summary[1].hour, 17);
        assert_eq!(summary[1].trip_count, 40);
    }

    #[test]
    fn insights_tolerate_missing_keys() {
        let body = r#"{"success": true, "insights": [{"name": "Top zones"}, {"data": [{"a": 1}]}]}"#;
        let envelope: Envelope<InsightsPayload> = serde_json::from_str(body).unwrap();
        let insights = envelope.into_payload().unwrap().insights;

        assert_eq!(insights.len(), 2);
        assert!(insights[0].data.is_empty());
        assert_eq!(insights[1].name, "");
    }
}
