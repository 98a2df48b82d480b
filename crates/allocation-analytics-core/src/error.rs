use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Non-positive price {value} in column '{column}' on {date}")]
    NonPositivePrice {
        date: NaiveDate,
        column: String,
        value: Decimal,
    },

    #[error("Dates must be strictly increasing: {current} follows {previous}")]
    NonMonotonicDates {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("Row dated {date} has {found} values, expected {expected}")]
    RaggedRow {
        date: NaiveDate,
        expected: usize,
        found: usize,
    },

    #[error("No observations between {start} and {end}")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Profile '{profile}' references no asset present in the price data")]
    NoUsableAssets { profile: String },

    #[error("Unsupported annualization factor {0}: use 252, 52, 12, 4 or 1")]
    UnsupportedAnnualization(u32),

    #[error("Duplicate column label: {0}")]
    DuplicateColumn(String),

    #[error("Numerical overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Coarse category of an [`AnalyticsError`], used by callers to pick a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Data,
    Configuration,
    Numerical,
}

impl AnalyticsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyticsError::NonPositivePrice { .. }
            | AnalyticsError::NonMonotonicDates { .. }
            | AnalyticsError::RaggedRow { .. }
            | AnalyticsError::EmptyWindow { .. }
            | AnalyticsError::InsufficientData(_) => ErrorKind::Data,
            AnalyticsError::InvalidInput { .. }
            | AnalyticsError::NoUsableAssets { .. }
            | AnalyticsError::UnsupportedAnnualization(_)
            | AnalyticsError::DuplicateColumn(_)
            | AnalyticsError::SerializationError(_) => ErrorKind::Configuration,
            AnalyticsError::Overflow { .. } => ErrorKind::Numerical,
        }
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        AnalyticsError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_error_carries_cell_context() {
        let err = AnalyticsError::NonPositivePrice {
            date: NaiveDate::from_ymd_opt(2024, 3, 29).unwrap(),
            column: "S&P 500".into(),
            value: Decimal::ZERO,
        };
        let msg = err.to_string();
        assert!(msg.contains("S&P 500"));
        assert!(msg.contains("2024-03-29"));
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn test_configuration_kind() {
        let err = AnalyticsError::NoUsableAssets {
            profile: "Moderate".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            AnalyticsError::UnsupportedAnnualization(365).kind(),
            ErrorKind::Configuration
        );
    }
}
