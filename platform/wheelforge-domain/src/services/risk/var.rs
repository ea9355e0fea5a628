use serde::Serialize;

/// Historical tail-loss statistics, all in percent per equity step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TailRisk {
    /// Loss at the `1 - confidence` quantile, floored at 0.
    pub value_at_risk: f64,
    /// Mean loss over the tail up to and including the VaR rank, floored at 0.
    pub conditional_value_at_risk: f64,
    pub best_day_pct: f64,
    pub worst_day_pct: f64,
}

pub fn tail_risk(returns: &[f64], confidence: f64) -> TailRisk {
    if returns.len() < 2 {
        return TailRisk::default();
    }

    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (((1.0 - confidence) * sorted.len() as f64).floor().max(0.0) as usize)
        .min(sorted.len() - 1);

    let tail = &sorted[..=rank];
    let tail_mean = tail.iter().sum::<f64>() / tail.len() as f64;

    TailRisk {
        value_at_risk: (-sorted[rank] * 100.0).max(0.0),
        conditional_value_at_risk: (-tail_mean * 100.0).max(0.0),
        best_day_pct: sorted[sorted.len() - 1] * 100.0,
        worst_day_pct: sorted[0] * 100.0,
    }
}
