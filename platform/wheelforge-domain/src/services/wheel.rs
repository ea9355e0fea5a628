//! The wheel state machine.
//!
//! Flat accounts sell cash-secured puts; once assigned, the shares are covered
//! by calls until they are called away. Each leg jumps `days_to_expiry` bars
//! and settles on the expiry close.

use crate::entities::position::PositionState;
use crate::entities::price_series::PriceSeries;
use crate::entities::simulation::{ComparisonPoint, LegOutcome, LegRecord, SimulationResult};
use crate::errors::ParameterError;
use crate::services::pricing::option_price;
use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::option_side::OptionSide;
use crate::value_objects::strategy_params::StrategyParameters;
use crate::value_objects::trade::Trade;

#[derive(Debug, Default)]
struct LegCounters {
    puts_sold: u32,
    calls_sold: u32,
    puts_assigned: u32,
    calls_assigned: u32,
    total_premium: f64,
}

impl LegCounters {
    fn record(&mut self, leg: &LegRecord) {
        self.total_premium += leg.premium;
        let assigned = u32::from(leg.is_assigned());
        match leg.side {
            OptionSide::Put => {
                self.puts_sold += 1;
                self.puts_assigned += assigned;
            }
            OptionSide::Call => {
                self.calls_sold += 1;
                self.calls_assigned += assigned;
            }
        }
    }
}

/// Runs the wheel over `series` with the series volatility as implied volatility.
///
/// A leg is only opened when at least one bar follows the current one, so the
/// last bar never carries an unsettled sale. Series shorter than one leg
/// settle at the last bar.
pub fn simulate(
    series: &PriceSeries,
    params: &StrategyParameters,
) -> Result<SimulationResult, ParameterError> {
    params.validate()?;

    let bars = series.bars();
    let last = bars.len() - 1;
    let volatility = series.volatility();
    let time_to_expiry = params.time_to_expiry_years();
    let shares_per_assignment = params.shares_per_assignment();
    let step = params.days_to_expiry as usize;

    let first_close = series.first().close;
    let last_close = series.last().close;
    let buy_hold_shares = params.initial_cash / first_close;

    let mut position = PositionState::new_with_cash(params.initial_cash);
    let mut counters = LegCounters::default();
    let mut equity_history = Vec::new();
    let mut comparison_series = Vec::new();
    let mut trades = Vec::new();
    let mut legs = Vec::new();

    let mut index = 0;
    while index < last {
        let open = &bars[index];
        let side = if position.is_flat() {
            OptionSide::Put
        } else {
            OptionSide::Call
        };
        let strike = side.otm_strike(open.close, params.otm_pct);
        let premium = option_price(
            open.close,
            strike,
            time_to_expiry,
            params.risk_free_rate,
            volatility,
            side,
        ) * params.contract_multiplier();

        position.credit_premium(premium);
        trades.push(Trade {
            date: open.date,
            kind: side.sell_kind(),
            strike,
            premium: Some(premium),
            underlying_price: open.close,
        });

        let expiry_index = (index + step).min(last);
        let expiry = &bars[expiry_index];
        let assigned = side.is_assigned(strike, expiry.close);
        if assigned {
            match side {
                OptionSide::Put => position.take_assignment(strike, shares_per_assignment),
                OptionSide::Call => position.deliver_shares(strike),
            }
            trades.push(Trade {
                date: expiry.date,
                kind: side.assigned_kind(),
                strike,
                premium: None,
                underlying_price: expiry.close,
            });
        }

        let leg = LegRecord {
            side,
            opened: open.date,
            expired: expiry.date,
            strike,
            premium,
            underlying_at_open: open.close,
            underlying_at_expiry: expiry.close,
            outcome: if assigned {
                LegOutcome::Assigned
            } else {
                LegOutcome::Expired
            },
        };
        counters.record(&leg);
        legs.push(leg);

        let wheel_value = position.value(expiry.close);
        equity_history.push(EquityPoint {
            date: expiry.date,
            portfolio_value: wheel_value,
            cash: position.cash(),
            shares_held: position.shares_held(),
        });
        comparison_series.push(ComparisonPoint {
            date: expiry.date,
            wheel: wheel_value,
            buy_hold: buy_hold_shares * expiry.close,
        });

        index = expiry_index;
    }

    let final_value = position.value(last_close);
    let buy_hold_final_value = buy_hold_shares * last_close;

    Ok(SimulationResult {
        initial_cash: params.initial_cash,
        final_value,
        buy_hold_final_value,
        wheel_return_pct: percent_change(params.initial_cash, final_value),
        buy_hold_return_pct: percent_change(params.initial_cash, buy_hold_final_value),
        total_premium: counters.total_premium,
        puts_sold: counters.puts_sold,
        calls_sold: counters.calls_sold,
        puts_assigned: counters.puts_assigned,
        calls_assigned: counters.calls_assigned,
        final_cash: position.cash(),
        final_shares: position.shares_held(),
        equity_history,
        trades,
        legs,
        comparison_series,
    })
}

fn percent_change(base: f64, value: f64) -> f64 {
    (value - base) / base * 100.0
}
