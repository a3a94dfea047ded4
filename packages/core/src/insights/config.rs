//! Insights strategy selection

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// Where chart and insight data come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InsightsSource {
    /// Pre-aggregated `/api/summary` and `/api/insights` endpoints.
    #[default]
    Remote,
    /// Reduce the full filtered record set on the client.
    Local,
}

impl FromStr for InsightsSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(InsightsSource::Remote),
            "local" => Ok(InsightsSource::Local),
            other => Err(format!("Invalid INSIGHTS_SOURCE: {}", other)),
        }
    }
}

impl fmt::Display for InsightsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightsSource::Remote => f.write_str("remote"),
            InsightsSource::Local => f.write_str("local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_sources_case_insensitively() {
        assert_eq!("Local".parse::<InsightsSource>(), Ok(InsightsSource::Local));
        assert_eq!(" remote ".parse::<InsightsSource>(), Ok(InsightsSource::Remote));
        assert!("server".parse::<InsightsSource>().is_err());
    }
}
