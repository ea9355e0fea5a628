use crate::value_objects::equity_point::EquityPoint;
use chrono::NaiveDate;
use serde::Serialize;

pub const RECENT_PERIODS: usize = 5;
pub const QUICK_RECOVERY_POINTS: usize = 30;

/// A closed excursion below the running peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPeriod {
    pub peak: NaiveDate,
    pub trough: NaiveDate,
    pub recovered: NaiveDate,
    pub depth_pct: f64,
    /// Equity points from the first dip up to, excluding, the new peak.
    pub duration_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownAnalysis {
    pub max_drawdown_pct: f64,
    /// Longest stretch of equity points below a peak, open drawdowns included.
    pub max_drawdown_duration_points: usize,
    pub current_drawdown_pct: f64,
    /// The last [`RECENT_PERIODS`] closed periods, oldest first.
    pub recent_periods: Vec<DrawdownPeriod>,
    /// Share of `recent_periods` that recovered within fewer than
    /// [`QUICK_RECOVERY_POINTS`] equity points; 100 when none.
    pub recovery_rate_pct: f64,
}

impl Default for DrawdownAnalysis {
    fn default() -> Self {
        Self {
            max_drawdown_pct: 0.0,
            max_drawdown_duration_points: 0,
            current_drawdown_pct: 0.0,
            recent_periods: Vec::new(),
            recovery_rate_pct: 100.0,
        }
    }
}

fn depth(peak: f64, trough: f64) -> f64 {
    if peak > 0.0 {
        (peak - trough) / peak
    } else {
        0.0
    }
}

/// Segments the equity curve into drawdown periods. A period opens on the
/// first point below the running peak and closes only when a strictly higher
/// peak is set; durations count equity points spent at or below the peak.
pub fn analyze_drawdowns(equity: &[EquityPoint]) -> DrawdownAnalysis {
    let Some(first) = equity.first() else {
        return DrawdownAnalysis::default();
    };

    let mut periods: Vec<DrawdownPeriod> = Vec::new();

    let mut peak_value = first.portfolio_value;
    let mut peak_date = first.date;
    let mut trough_value = first.portfolio_value;
    let mut trough_date = first.date;
    let mut in_drawdown = false;
    let mut duration = 0usize;

    let mut max_depth = 0.0f64;
    let mut max_duration = 0usize;

    for point in equity.iter().skip(1) {
        let value = point.portfolio_value;
        if value > peak_value {
            if in_drawdown {
                periods.push(DrawdownPeriod {
                    peak: peak_date,
                    trough: trough_date,
                    recovered: point.date,
                    depth_pct: depth(peak_value, trough_value) * 100.0,
                    duration_points: duration,
                });
            }
            peak_value = value;
            peak_date = point.date;
            trough_value = value;
            trough_date = point.date;
            in_drawdown = false;
            duration = 0;
            continue;
        }

        if !in_drawdown {
            if value == peak_value {
                continue;
            }
            in_drawdown = true;
        }
        duration += 1;
        if value <= trough_value {
            trough_value = value;
            trough_date = point.date;
        }
        max_depth = max_depth.max(depth(peak_value, trough_value));
        max_duration = max_duration.max(duration);
    }

    let last_value = equity[equity.len() - 1].portfolio_value;
    let current = if in_drawdown {
        depth(peak_value, last_value)
    } else {
        0.0
    };

    let recent_start = periods.len().saturating_sub(RECENT_PERIODS);
    let recent_periods = periods.split_off(recent_start);
    let recovery_rate_pct = if recent_periods.is_empty() {
        100.0
    } else {
        let quick = recent_periods
            .iter()
            .filter(|period| period.duration_points < QUICK_RECOVERY_POINTS)
            .count();
        quick as f64 / recent_periods.len() as f64 * 100.0
    };

    DrawdownAnalysis {
        max_drawdown_pct: max_depth * 100.0,
        max_drawdown_duration_points: max_duration,
        current_drawdown_pct: current * 100.0,
        recent_periods,
        recovery_rate_pct,
    }
}
