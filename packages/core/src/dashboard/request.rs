//! Request builder.
//!
//! Turns pagination and filter inputs into a canonical [`RequestDescriptor`]:
//! a path plus ordered query parameters. Pure; no validation of ranges.

use reqwest::Url;

use crate::dashboard::types::FilterCriteria;
use crate::error::FetchError;

pub const TRIPS_PATH: &str = "/api/trips";
pub const SUMMARY_PATH: &str = "/api/summary";
pub const INSIGHTS_PATH: &str = "/api/insights";
/// Legacy full-record-set endpoints, used by the local insights strategy.
pub const TRIP_SET_PATH: &str = "/trips";
pub const FILTER_PATH: &str = "/filter";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
}

impl RequestDescriptor {
    /// `GET /api/trips?page=..&per_page=..[&filters]`.
    ///
    /// `page` and `per_page` are always present; a filter appears only
    /// when it has a value.
    pub fn trips_page(page: u32, per_page: u32, filters: &FilterCriteria) -> Self {
        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        query.extend(filter_params(filters));

        Self {
            path: TRIPS_PATH,
            query,
        }
    }

    /// Single-record page, independent of the current filters.
    pub fn most_recent_trip() -> Self {
        Self::trips_page(1, 1, &FilterCriteria::default())
    }

    pub fn summary() -> Self {
        Self {
            path: SUMMARY_PATH,
            query: Vec::new(),
        }
    }

    pub fn insights() -> Self {
        Self {
            path: INSIGHTS_PATH,
            query: Vec::new(),
        }
    }

    /// Full record set: `/trips` when unfiltered, `/filter?..` otherwise.
    pub fn trip_set(filters: &FilterCriteria) -> Self {
        if filters.is_empty() {
            Self {
                path: TRIP_SET_PATH,
                query: Vec::new(),
            }
        } else {
            Self {
                path: FILTER_PATH,
                query: filter_params(filters).collect(),
            }
        }
    }

    /// Resolve against an API base URL, percent-encoding the query.
    pub fn url(&self, base_url: &str) -> Result<Url, FetchError> {
        let raw = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let url = if self.query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, self.query.iter().map(|(k, v)| (*k, v.as_str())))
        };

        url.map_err(|err| FetchError::network(format!("invalid URL '{}': {}", raw, err)))
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn filter_params(filters: &FilterCriteria) -> impl Iterator<Item = (&'static str, String)> + '_ {
    filters
        .params()
        .map(|(field, value)| (field.param_name(), value.to_string()))
}
