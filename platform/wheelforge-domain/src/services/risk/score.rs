use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLabel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=20 => Self::VeryLow,
            21..=40 => Self::Low,
            41..=55 => Self::Moderate,
            56..=75 => Self::High,
            _ => Self::VeryHigh,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        };
        f.write_str(label)
    }
}

/// One component of the composite score: the observed value and the points it added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub name: &'static str,
    pub value: f64,
    pub points: f64,
    pub max_points: f64,
}

/// Observations feeding the composite score.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreInputs {
    pub max_drawdown_pct: f64,
    pub assignment_rate_pct: f64,
    pub value_at_risk_pct: f64,
    pub max_loss_streak: u32,
    pub return_std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    pub score: u32,
    pub label: RiskLabel,
    pub factors: Vec<RiskFactor>,
}

fn factor(name: &'static str, value: f64, weight: f64, max_points: f64) -> RiskFactor {
    let points = (value * weight).clamp(0.0, max_points);
    RiskFactor {
        name,
        value,
        points,
        max_points,
    }
}

/// 0–100 composite; lower is safer.
pub fn composite_score(inputs: &ScoreInputs) -> RiskScore {
    let factors = vec![
        factor("max_drawdown", inputs.max_drawdown_pct, 1.5, 30.0),
        factor("assignment_rate", inputs.assignment_rate_pct, 0.5, 25.0),
        factor("value_at_risk", inputs.value_at_risk_pct, 4.0, 20.0),
        factor(
            "max_loss_streak",
            f64::from(inputs.max_loss_streak),
            5.0,
            15.0,
        ),
        factor("return_volatility", inputs.return_std, 500.0, 10.0),
    ];

    let total: f64 = factors.iter().map(|f| f.points).sum();
    let score = if total.is_finite() {
        total.round().clamp(0.0, 100.0) as u32
    } else {
        100
    };

    RiskScore {
        score,
        label: RiskLabel::from_score(score),
        factors,
    }
}
