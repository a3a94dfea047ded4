//! Trip Insights Module
//!
//! Derived statistics over trip records (averages, extremes, busiest hour,
//! payment mix) and the providers that supply chart and insight data to
//! the dashboard, either from the server or computed locally.

pub mod config;
pub mod error;
pub mod provider;
pub mod reducer;
pub mod types;


pub use config::InsightsSource;
pub use error::InsightsError;
pub use provider::{InsightsProvider, InsightsScope, LocalInsightsProvider, RemoteInsightsProvider};
pub use types::*;
