use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::returns::compound;
use crate::types::Rate;
use crate::AnalyticsResult;

/// Peak-to-trough statistics of a return series.
///
/// Indices refer to the wealth path including its starting point: index 0 is
/// the initial wealth of 1, index `i` is the wealth after the `i`-th return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    /// Worst drawdown, as a non-positive fraction (-0.25 = 25% below peak)
    pub max_drawdown: Rate,
    /// Wealth-path index of the peak preceding the worst trough
    pub peak_index: usize,
    /// Wealth-path index of the worst trough
    pub trough_index: usize,
    /// Periods from that peak to that trough
    pub duration_periods: usize,
    /// Drawdown after each return, `(W - peak) / peak`
    pub underwater: Vec<Rate>,
}

/// Walk the compounded wealth path, tracking the running peak.
pub fn analyze_drawdown(returns: &[Rate]) -> AnalyticsResult<DrawdownAnalysis> {
    let mut wealth = Decimal::ONE;
    let mut peak = Decimal::ONE;
    let mut peak_idx = 0usize;
    let mut max_dd = Decimal::ZERO;
    let mut worst_peak = 0usize;
    let mut worst_trough = 0usize;
    let mut underwater = Vec::with_capacity(returns.len());

    for (i, r) in returns.iter().enumerate() {
        wealth = compound(wealth, *r)?;
        if wealth > peak {
            peak = wealth;
            peak_idx = i + 1;
        }
        let dd = if peak.is_zero() {
            Decimal::ZERO
        } else {
            (wealth - peak) / peak
        };
        if dd < max_dd {
            max_dd = dd;
            worst_peak = peak_idx;
            worst_trough = i + 1;
        }
        underwater.push(dd);
    }

    Ok(DrawdownAnalysis {
        max_drawdown: max_dd,
        peak_index: worst_peak,
        trough_index: worst_trough,
        duration_periods: worst_trough - worst_peak,
        underwater,
    })
}

/// Maximum drawdown of a return series; 0 when wealth never falls below a peak.
pub fn max_drawdown(returns: &[Rate]) -> AnalyticsResult<Rate> {
    Ok(analyze_drawdown(returns)?.max_drawdown)
}
