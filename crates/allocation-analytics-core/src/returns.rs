use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::prices::PriceSeries;
use crate::types::{ColumnLabel, Rate, SeriesPoint};
use crate::AnalyticsResult;

/// Sampling frequency of the price table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Daily => 252,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Annual => 1,
        }
    }

    pub fn annualization_factor(&self) -> Decimal {
        Decimal::from(self.periods_per_year())
    }

    /// Inverse of [`Frequency::periods_per_year`]; any other count is rejected.
    pub fn from_periods_per_year(periods: u32) -> AnalyticsResult<Self> {
        match periods {
            252 => Ok(Frequency::Daily),
            52 => Ok(Frequency::Weekly),
            12 => Ok(Frequency::Monthly),
            4 => Ok(Frequency::Quarterly),
            1 => Ok(Frequency::Annual),
            other => Err(AnalyticsError::UnsupportedAnnualization(other)),
        }
    }
}

/// How cumulative performance series are rebased
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CumulativeBase {
    /// Growth of 1 minus 1: starts at 0, a value of 0.12 means +12%
    #[default]
    Zero,
    /// Growth of 100: starts at 100, a value of 112 means +12%
    Hundred,
}

/// Simple periodic returns, one row per price row after the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    pub(crate) dates: Vec<NaiveDate>,
    pub(crate) columns: Vec<ColumnLabel>,
    pub(crate) rows: Vec<Vec<Rate>>,
}

impl ReturnSeries {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[ColumnLabel] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Rate>] {
        &self.rows
    }

    /// Number of return periods.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, asset: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.asset == asset)
    }

    /// All returns of one column, in date order.
    pub fn column(&self, idx: usize) -> Vec<Rate> {
        self.rows.iter().map(|row| row[idx]).collect()
    }
}

/// Convert price levels into simple returns: `p[t] / p[t-1] - 1` per column.
///
/// The first date has no prior price and is dropped. Every price must be
/// strictly positive; the first offending cell (in date order, then column
/// order) is reported as [`AnalyticsError::NonPositivePrice`].
pub fn compute_returns(prices: &PriceSeries) -> AnalyticsResult<ReturnSeries> {
    for (date, row) in prices.dates().iter().zip(prices.rows()) {
        for (col, value) in row.iter().enumerate() {
            if *value <= Decimal::ZERO {
                return Err(AnalyticsError::NonPositivePrice {
                    date: *date,
                    column: prices.columns()[col].to_string(),
                    value: *value,
                });
            }
        }
    }

    let rows: Vec<Vec<Rate>> = prices
        .rows()
        .windows(2)
        .map(|pair| {
            pair[1]
                .iter()
                .zip(pair[0].iter())
                .map(|(curr, prev)| {
                    curr.checked_div(*prev)
                        .map(|ratio| ratio - Decimal::ONE)
                        .ok_or_else(|| AnalyticsError::Overflow {
                            context: format!("price ratio {curr} / {prev}"),
                        })
                })
                .collect::<AnalyticsResult<Vec<Rate>>>()
        })
        .collect::<AnalyticsResult<_>>()?;

    Ok(ReturnSeries {
        dates: prices.dates().iter().skip(1).copied().collect(),
        columns: prices.columns().to_vec(),
        rows,
    })
}

/// One compounding step `wealth * (1 + r)`, failing instead of overflowing.
pub(crate) fn compound(wealth: Decimal, r: Rate) -> AnalyticsResult<Decimal> {
    Decimal::ONE
        .checked_add(r)
        .and_then(|growth| wealth.checked_mul(growth))
        .ok_or_else(|| AnalyticsError::Overflow {
            context: format!("compounding wealth {wealth} by return {r}"),
        })
}

/// Compounded wealth path `W[i] = W[i-1] * (1 + r[i])` starting from 1.
pub fn growth_path(returns: &[Rate]) -> AnalyticsResult<Vec<Decimal>> {
    let mut wealth = Decimal::ONE;
    returns
        .iter()
        .map(|r| -> AnalyticsResult<Decimal> {
            wealth = compound(wealth, *r)?;
            Ok(wealth)
        })
        .collect()
}

/// Full-period compounded return: `prod(1 + r) - 1`.
pub fn total_return(returns: &[Rate]) -> AnalyticsResult<Rate> {
    let wealth = returns
        .iter()
        .try_fold(Decimal::ONE, |acc, r| compound(acc, *r))?;
    Ok(wealth - Decimal::ONE)
}

/// Dated cumulative performance series, rebased per `base`.
pub fn cumulative_series(
    dates: &[NaiveDate],
    returns: &[Rate],
    base: CumulativeBase,
) -> AnalyticsResult<Vec<SeriesPoint>> {
    dates
        .iter()
        .zip(growth_path(returns)?)
        .map(|(date, wealth)| -> AnalyticsResult<SeriesPoint> {
            let value = match base {
                CumulativeBase::Zero => wealth - Decimal::ONE,
                CumulativeBase::Hundred => {
                    wealth
                        .checked_mul(dec!(100))
                        .ok_or_else(|| AnalyticsError::Overflow {
                            context: format!("rebasing wealth {wealth} to 100"),
                        })?
                }
            };
            Ok(SeriesPoint { date: *date, value })
        })
        .collect()
}
