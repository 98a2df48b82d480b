use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use crate::error::AnalyticsError;
use crate::types::{ColumnLabel, DateWindow};
use crate::AnalyticsResult;

/// Date-indexed grid of price-index levels, one column per asset.
///
/// Construction validates the shape: strictly increasing dates, one value per
/// column on every row and unique asset identifiers. Price positivity is
/// checked when returns are derived, so the failing cell can be reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    columns: Vec<ColumnLabel>,
    rows: Vec<Vec<Decimal>>,
}

impl PriceSeries {
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: Vec<ColumnLabel>,
        rows: Vec<Vec<Decimal>>,
    ) -> AnalyticsResult<Self> {
        if columns.is_empty() {
            return Err(AnalyticsError::InvalidInput {
                field: "columns".into(),
                reason: "Price table must have at least one asset column".into(),
            });
        }
        if dates.is_empty() {
            return Err(AnalyticsError::InsufficientData(
                "Price table has no rows".into(),
            ));
        }
        if dates.len() != rows.len() {
            return Err(AnalyticsError::InvalidInput {
                field: "rows".into(),
                reason: format!("{} dates but {} rows", dates.len(), rows.len()),
            });
        }

        let mut seen = HashSet::new();
        for label in &columns {
            if !seen.insert(label.asset.as_str()) {
                return Err(AnalyticsError::DuplicateColumn(label.to_string()));
            }
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(AnalyticsError::NonMonotonicDates {
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }

        for (date, row) in dates.iter().zip(rows.iter()) {
            if row.len() != columns.len() {
                return Err(AnalyticsError::RaggedRow {
                    date: *date,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }

        Ok(Self {
            dates,
            columns,
            rows,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Decimal>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Position of the column whose asset identifier is `asset`.
    pub fn column_index(&self, asset: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.asset == asset)
    }

    /// The `[first, last]` date range covered by the table.
    pub fn full_window(&self) -> DateWindow {
        // Non-empty by construction.
        DateWindow::new(self.dates[0], self.dates[self.dates.len() - 1])
    }

    /// New table restricted to the inclusive `window`.
    pub fn slice(&self, window: &DateWindow) -> AnalyticsResult<PriceSeries> {
        if window.start > window.end {
            return Err(AnalyticsError::InvalidInput {
                field: "window".into(),
                reason: format!(
                    "Start date {} is after end date {}",
                    window.start, window.end
                ),
            });
        }

        let lo = self.dates.partition_point(|d| *d < window.start);
        let hi = self.dates.partition_point(|d| *d <= window.end);
        if lo >= hi {
            return Err(AnalyticsError::EmptyWindow {
                start: window.start,
                end: window.end,
            });
        }

        Ok(PriceSeries {
            dates: self.dates[lo..hi].to_vec(),
            columns: self.columns.clone(),
            rows: self.rows[lo..hi].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> PriceSeries {
        PriceSeries::new(
            vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 29), d(2024, 4, 30)],
            vec![ColumnLabel::flat("Equity"), ColumnLabel::flat("Cash")],
            vec![
                vec![dec!(100), dec!(100)],
                vec![dec!(102), dec!(100.4)],
                vec![dec!(99), dec!(100.8)],
                vec![dec!(104), dec!(101.2)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        let err = PriceSeries::new(
            vec![d(2024, 2, 29), d(2024, 1, 31)],
            vec![ColumnLabel::flat("Equity")],
            vec![vec![dec!(100)], vec![dec!(101)]],
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::NonMonotonicDates { .. }));
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let err = PriceSeries::new(
            vec![d(2024, 1, 31), d(2024, 1, 31)],
            vec![ColumnLabel::flat("Equity")],
            vec![vec![dec!(100)], vec![dec!(101)]],
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::NonMonotonicDates { .. }));
    }

    #[test]
    fn test_rejects_ragged_row() {
        let err = PriceSeries::new(
            vec![d(2024, 1, 31), d(2024, 2, 29)],
            vec![ColumnLabel::flat("Equity"), ColumnLabel::flat("Cash")],
            vec![vec![dec!(100), dec!(100)], vec![dec!(101)]],
        )
        .unwrap_err();
        match err {
            AnalyticsError::RaggedRow { date, expected, found } => {
                assert_eq!(date, d(2024, 2, 29));
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_rejects_duplicate_asset() {
        let err = PriceSeries::new(
            vec![d(2024, 1, 31)],
            vec![
                ColumnLabel::new("Equity", "S&P 500"),
                ColumnLabel::new("Alternatives", "S&P 500"),
            ],
            vec![vec![dec!(100), dec!(100)]],
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::DuplicateColumn(_)));
    }

    #[test]
    fn test_slice_is_inclusive() {
        let prices = sample();
        let sliced = prices
            .slice(&DateWindow::new(d(2024, 2, 29), d(2024, 3, 29)))
            .unwrap();
        assert_eq!(sliced.dates(), &[d(2024, 2, 29), d(2024, 3, 29)]);
        assert_eq!(sliced.rows()[0][0], dec!(102));
    }

    #[test]
    fn test_slice_to_full_window_is_identity() {
        let prices = sample();
        let sliced = prices.slice(&prices.full_window()).unwrap();
        assert_eq!(sliced, prices);
    }

    #[test]
    fn test_slice_empty_window() {
        let prices = sample();
        let err = prices
            .slice(&DateWindow::new(d(2025, 1, 1), d(2025, 6, 30)))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyWindow { .. }));
    }

    #[test]
    fn test_slice_inverted_window() {
        let prices = sample();
        let err = prices
            .slice(&DateWindow::new(d(2024, 4, 30), d(2024, 1, 31)))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput { .. }));
    }
}
