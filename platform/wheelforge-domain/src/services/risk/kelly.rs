use crate::entities::simulation::LegRecord;
use serde::Serialize;

/// Assumed loss on an assigned contract: 3% of the average strike, per 100 shares.
pub const ASSIGNMENT_LOSS_FRACTION: f64 = 0.03;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KellySizing {
    pub kelly_fraction: f64,
    pub half_kelly: f64,
    pub win_rate: f64,
    pub payoff_ratio: f64,
}

/// Kelly sizing treating an expired leg as a win worth its premium and an
/// assigned leg as a loss of [`ASSIGNMENT_LOSS_FRACTION`] of the strike.
pub fn kelly_sizing(legs: &[LegRecord]) -> KellySizing {
    if legs.is_empty() {
        return KellySizing::default();
    }

    let sold = legs.len() as f64;
    let assigned = legs.iter().filter(|leg| leg.is_assigned()).count() as f64;
    let win_rate = (sold - assigned) / sold;
    let loss_rate = 1.0 - win_rate;

    let avg_premium = legs.iter().map(|leg| leg.premium).sum::<f64>() / sold;
    let avg_strike = legs.iter().map(|leg| leg.strike).sum::<f64>() / sold;
    let avg_loss = avg_strike * ASSIGNMENT_LOSS_FRACTION * 100.0;
    let payoff_ratio = if avg_loss > 0.0 {
        avg_premium / avg_loss
    } else {
        0.0
    };

    if loss_rate <= 0.0 {
        return KellySizing {
            kelly_fraction: win_rate,
            half_kelly: win_rate / 2.0,
            win_rate,
            payoff_ratio,
        };
    }

    let kelly = if payoff_ratio > 0.0 {
        (win_rate - loss_rate / payoff_ratio).max(0.0)
    } else {
        0.0
    };

    KellySizing {
        kelly_fraction: kelly,
        half_kelly: kelly / 2.0,
        win_rate,
        payoff_ratio,
    }
}
