use crate::services::pricing::option_greeks;
use crate::value_objects::greeks::Greeks;
use crate::value_objects::option_side::OptionSide;
use crate::value_objects::strategy_params::{StrategyParameters, SHARES_PER_CONTRACT};
use serde::Serialize;

pub const SCENARIO_RANGE: f64 = 0.30;
pub const SCENARIO_STEPS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrikeGreeks {
    pub strike: f64,
    #[serde(flatten)]
    pub greeks: Greeks,
}

/// Greeks of the put and the call the wheel would sell today.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelGreeks {
    pub put: StrikeGreeks,
    pub call: StrikeGreeks,
    pub spot: f64,
    pub volatility: f64,
    pub days_to_expiry: u32,
}

pub fn wheel_greeks(spot: f64, volatility: f64, params: &StrategyParameters) -> WheelGreeks {
    let time_to_expiry = params.time_to_expiry_years();
    let leg = |side: OptionSide| {
        let strike = side.otm_strike(spot, params.otm_pct);
        StrikeGreeks {
            strike,
            greeks: option_greeks(
                spot,
                strike,
                time_to_expiry,
                params.risk_free_rate,
                volatility,
                side,
            ),
        }
    };

    WheelGreeks {
        put: leg(OptionSide::Put),
        call: leg(OptionSide::Call),
        spot,
        volatility,
        days_to_expiry: params.days_to_expiry,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PnlPoint {
    pub price: f64,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlProfile {
    pub side: OptionSide,
    pub strike: f64,
    pub premium: f64,
    pub breakeven: f64,
    pub points: Vec<PnlPoint>,
}

/// Expiry P&L of one short option leg across spot ±30%.
///
/// `premium` is the dollar premium of one contract. The breakeven is the
/// strike shifted by the premium per share, which is the same for any
/// number of `contracts`.
pub fn pnl_scenarios(
    spot: f64,
    strike: f64,
    premium: f64,
    side: OptionSide,
    contracts: u32,
) -> PnlProfile {
    let contracts = f64::from(contracts.max(1));
    let range = spot * SCENARIO_RANGE;
    let step = range * 2.0 / SCENARIO_STEPS as f64;
    let multiplier = SHARES_PER_CONTRACT as f64;

    let points = (0..=SCENARIO_STEPS)
        .map(|i| {
            let price = spot - range + i as f64 * step;
            let intrinsic = match side {
                OptionSide::Put => (strike - price).max(0.0),
                OptionSide::Call => (price - strike).max(0.0),
            };
            PnlPoint {
                price,
                pnl: (premium - intrinsic * multiplier) * contracts,
            }
        })
        .collect();

    let premium_per_share = premium / multiplier;
    let breakeven = match side {
        OptionSide::Put => strike - premium_per_share,
        OptionSide::Call => strike + premium_per_share,
    };

    PnlProfile {
        side,
        strike,
        premium,
        breakeven,
        points,
    }
}
