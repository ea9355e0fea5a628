use crate::value_objects::equity_point::EquityPoint;
use serde::Serialize;

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct MetricsSummary {
    pub points: usize,
    pub net_profit: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricsConfig {
    pub risk_free_rate: f64,
    pub annualization_factor: Option<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            annualization_factor: None,
        }
    }
}

/// Running equity-curve statistics: peak-to-trough drawdown and a per-point Sharpe ratio.
#[derive(Debug, Default)]
pub struct MetricsState {
    equity_curve: Vec<f64>,
    peak_equity: f64,
    max_drawdown: f64,
    config: MetricsConfig,
}

impl MetricsState {
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            equity_curve: Vec::new(),
            peak_equity: 0.0,
            max_drawdown: 0.0,
            config,
        }
    }

    pub fn from_points(config: MetricsConfig, points: &[EquityPoint]) -> Self {
        let mut state = Self::new(config);
        for point in points {
            state.record_equity(point.portfolio_value);
        }
        state
    }

    pub fn record_equity(&mut self, equity: f64) {
        if self.peak_equity == 0.0 || equity > self.peak_equity {
            self.peak_equity = equity;
        } else if self.peak_equity > 0.0 {
            let drawdown = (self.peak_equity - equity) / self.peak_equity;
            if drawdown > self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
        self.equity_curve.push(equity);
    }

    /// Peak-to-trough drawdown as a fraction of the peak.
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            points: self.equity_curve.len(),
            net_profit: self.net_profit(),
            sharpe: self.sharpe_ratio(),
            max_drawdown: self.max_drawdown,
        }
    }

    fn net_profit(&self) -> f64 {
        match (self.equity_curve.first(), self.equity_curve.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    fn sharpe_ratio(&self) -> f64 {
        if self.equity_curve.len() < 2 {
            return 0.0;
        }

        let mut returns = Vec::with_capacity(self.equity_curve.len() - 1);
        for pair in self.equity_curve.windows(2) {
            let prev = pair[0];
            let curr = pair[1];
            if prev > 0.0 {
                let ret = curr / prev - 1.0;
                returns.push(ret - self.config.risk_free_rate);
            }
        }

        if returns.len() < 2 {
            return 0.0;
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let var = returns
            .iter()
            .map(|ret| {
                let diff = ret - mean;
                diff * diff
            })
            .sum::<f64>()
            / (returns.len() as f64 - 1.0);

        let std = var.sqrt();
        if std == 0.0 {
            0.0
        } else {
            let scale = self
                .config
                .annualization_factor
                .unwrap_or(returns.len() as f64);
            mean / std * scale.sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MetricsConfig, MetricsState};

    #[test]
    fn computes_net_profit_and_drawdown() {
        let mut metrics = MetricsState::new(MetricsConfig::default());
        metrics.record_equity(100.0);
        metrics.record_equity(80.0);
        metrics.record_equity(120.0);

        let summary = metrics.summary();
        assert_eq!(summary.points, 3);
        assert_eq!(summary.net_profit, 20.0);
        assert!((summary.max_drawdown - 0.2).abs() < 1e-12);
    }

    #[test]
    fn flat_curve_has_zero_sharpe() {
        let mut metrics = MetricsState::new(MetricsConfig {
            risk_free_rate: 0.0,
            annualization_factor: Some(252.0),
        });
        for _ in 0..5 {
            metrics.record_equity(1_000.0);
        }
        assert_eq!(metrics.summary().sharpe, 0.0);
        assert_eq!(metrics.max_drawdown(), 0.0);
    }
}
