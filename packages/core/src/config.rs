use std::env;
use std::time::Duration;

use crate::cli::Cli;
use crate::dashboard::orchestrator::{DashboardOptions, DEFAULT_REQUEST_TIMEOUT};
use crate::dashboard::request::DEFAULT_PER_PAGE;
use crate::insights::InsightsSource;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_seconds: u64,
    pub default_per_page: u32,
    pub insights_source: InsightsSource,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys fall back to defaults;
    /// present but invalid values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let api_url = lookup("DASHBOARD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout_seconds = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(raw) => parse_positive(&raw, "REQUEST_TIMEOUT_SECONDS")?,
            None => DEFAULT_REQUEST_TIMEOUT.as_secs(),
        };

        let default_per_page = match lookup("DEFAULT_PER_PAGE") {
            Some(raw) => parse_positive(&raw, "DEFAULT_PER_PAGE")?,
            None => DEFAULT_PER_PAGE,
        };

        let insights_source = match lookup("INSIGHTS_SOURCE") {
            Some(raw) => raw.parse::<InsightsSource>()?,
            None => InsightsSource::default(),
        };

        Ok(Self {
            api_url,
            request_timeout_seconds,
            default_per_page,
            insights_source,
        })
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), String> {
        if let Some(api_url) = &cli.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(timeout) = cli.timeout {
            if timeout == 0 {
                return Err("--timeout must be greater than zero".to_string());
            }
            self.request_timeout_seconds = timeout;
        }
        if let Some(per_page) = cli.per_page {
            if per_page == 0 {
                return Err("--per-page must be greater than zero".to_string());
            }
            self.default_per_page = per_page;
        }
        if let Some(insights) = cli.insights {
            self.insights_source = insights;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            request_timeout: self.request_timeout(),
            per_page: self.default_per_page,
        }
    }
}

fn parse_positive<T>(raw: &str, key: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(format!("{} must be a positive number", key)),
    }
}
