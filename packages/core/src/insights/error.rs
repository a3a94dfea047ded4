//! Error types for trip insights operations

use thiserror::Error;

use crate::error::FetchError;

/// Errors that can occur while producing insights
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsightsError {
    #[error("Insights source failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Insufficient data for calculation: {operation}")]
    InsufficientData { operation: String },
}

impl InsightsError {
    pub fn insufficient_data(operation: impl Into<String>) -> Self {
        Self::InsufficientData {
            operation: operation.into(),
        }
    }
}

/// Result type for insight operations
pub type InsightsResult<T> = Result<T, InsightsError>;
