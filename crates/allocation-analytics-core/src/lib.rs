//! Risk/return analytics for multi-asset allocations.
//!
//! The engine is a pure function of a price table, a set of weight profiles
//! and an [`AnalyticsConfig`]. Weights are percentages divided by 100 and are
//! never rescaled to their sum, so profiles that do not add up to 100% are
//! evaluated as partly unfunded (below 100) or levered (above 100).

pub mod aggregator;
pub mod benchmark;
pub mod config;
pub mod covariance;
pub mod drawdown;
pub mod error;
mod math;
pub mod prices;
pub mod report;
pub mod returns;
pub mod risk_decomposition;
pub mod types;
pub mod weights;

pub use config::AnalyticsConfig;
pub use error::{AnalyticsError, ErrorKind};
pub use prices::PriceSeries;
pub use report::{build_report, PerformanceReport, ProfileOutcome, ReportInput};
pub use returns::Frequency;
pub use types::*;
pub use weights::{WeightProfile, WeightTable};

/// Standard result type for all analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
