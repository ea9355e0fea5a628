//! Preset wheel configurations and a profile-based ranking over them.

use crate::value_objects::strategy_params::StrategyParameters;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyTargets {
    pub monthly_return: &'static str,
    pub annual_return: &'static str,
    pub max_drawdown: &'static str,
    pub assignment_frequency: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PresetStrategy {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub suitability: &'static str,
    /// 1 (safest) to 5.
    pub risk_level: u8,
    pub symbol: &'static str,
    pub otm_pct: f64,
    pub days_to_expiry: u32,
    pub contracts: u32,
    pub initial_cash: f64,
    pub targets: StrategyTargets,
    pub tips: &'static [&'static str],
}

impl PresetStrategy {
    pub fn parameters(&self, risk_free_rate: f64) -> StrategyParameters {
        StrategyParameters {
            initial_cash: self.initial_cash,
            otm_pct: self.otm_pct,
            days_to_expiry: self.days_to_expiry,
            risk_free_rate,
            contracts: self.contracts,
        }
    }
}

pub static PRESETS: [PresetStrategy; 6] = [
    PresetStrategy {
        id: "conservative-income",
        name: "Conservative Income",
        description: "Deep out-of-the-money puts on a broad index ETF for steady premium with capital preservation first.",
        suitability: "Beginners and capital-first accounts",
        risk_level: 1,
        symbol: "SPY",
        otm_pct: 0.07,
        days_to_expiry: 30,
        contracts: 1,
        initial_cash: 50_000.0,
        targets: StrategyTargets {
            monthly_return: "0.8-1.5%",
            annual_return: "10-18%",
            max_drawdown: "< 8%",
            assignment_frequency: "rare (< 15%)",
        },
        tips: &[
            "Sell puts after down days when implied volatility rises",
            "30-45 days to expiry balances decay against management effort",
            "Roll down and out when the strike is threatened",
        ],
    },
    PresetStrategy {
        id: "balanced-growth",
        name: "Balanced Growth",
        description: "Blend of premium income and appreciation on a large-cap technology name.",
        suitability: "Intermediate traders on a one to three year horizon",
        risk_level: 2,
        symbol: "AAPL",
        otm_pct: 0.05,
        days_to_expiry: 14,
        contracts: 1,
        initial_cash: 50_000.0,
        targets: StrategyTargets {
            monthly_return: "1.5-3%",
            annual_return: "18-36%",
            max_drawdown: "< 15%",
            assignment_frequency: "moderate (20-30%)",
        },
        tips: &[
            "Bi-weekly expirations rotate capital faster",
            "Widen the strike distance around earnings",
            "Keep a cash reserve for assignment",
        ],
    },
    PresetStrategy {
        id: "aggressive-premium",
        name: "Aggressive Premium",
        description: "Close strikes on a high-volatility stock for maximum premium at a high assignment rate.",
        suitability: "Experienced traders comfortable holding shares",
        risk_level: 4,
        symbol: "TSLA",
        otm_pct: 0.03,
        days_to_expiry: 7,
        contracts: 1,
        initial_cash: 75_000.0,
        targets: StrategyTargets {
            monthly_return: "3-6%",
            annual_return: "36-72%",
            max_drawdown: "< 25%",
            assignment_frequency: "frequent (40-60%)",
        },
        tips: &[
            "Weekly expiries maximize decay but carry gamma risk",
            "Have the covered call plan ready before the put is sold",
            "Never put more than 30% of the account on one ticker",
        ],
    },
    PresetStrategy {
        id: "theta-harvest",
        name: "Theta Harvest",
        description: "Medium strike distance on short expiries to sit on the steep part of the decay curve.",
        suitability: "Data-driven traders",
        risk_level: 3,
        symbol: "MSFT",
        otm_pct: 0.04,
        days_to_expiry: 10,
        contracts: 2,
        initial_cash: 100_000.0,
        targets: StrategyTargets {
            monthly_return: "2-4%",
            annual_return: "24-48%",
            max_drawdown: "< 18%",
            assignment_frequency: "moderate (25-35%)",
        },
        tips: &[
            "Ten days to expiry captures the steepest decay",
            "Gamma moves positions quickly under ten days",
            "Check the earnings calendar before each sale",
        ],
    },
    PresetStrategy {
        id: "blue-chip-safe",
        name: "Blue Chip Safe Haven",
        description: "Deep strikes and long expiries on a blue-chip name for large accounts seeking stability.",
        suitability: "Large accounts focused on preservation",
        risk_level: 1,
        symbol: "MSFT",
        otm_pct: 0.08,
        days_to_expiry: 45,
        contracts: 1,
        initial_cash: 100_000.0,
        targets: StrategyTargets {
            monthly_return: "0.5-1.2%",
            annual_return: "6-14%",
            max_drawdown: "< 6%",
            assignment_frequency: "very rare (< 10%)",
        },
        tips: &[
            "45 days leaves room to roll or close early",
            "Suits retirement accounts",
            "Close at half the maximum profit to recycle capital",
        ],
    },
    PresetStrategy {
        id: "momentum-capture",
        name: "Momentum Capture",
        description: "Near-the-money weeklies on a high-momentum stock with elevated volatility.",
        suitability: "Advanced traders",
        risk_level: 5,
        symbol: "NVDA",
        otm_pct: 0.02,
        days_to_expiry: 5,
        contracts: 1,
        initial_cash: 50_000.0,
        targets: StrategyTargets {
            monthly_return: "4-8%+",
            annual_return: "48%+",
            max_drawdown: "< 35%",
            assignment_frequency: "very frequent (50-70%)",
        },
        tips: &[
            "Enter only when implied volatility rank is above 50%",
            "Five-day expiries carry the most gamma and premium",
            "Exit if the underlying falls more than 5% below the strike",
        ],
    },
];

pub fn preset(id: &str) -> Option<&'static PresetStrategy> {
    PRESETS.iter().find(|strategy| strategy.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    Beginner,
    Basics,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Income,
    Growth,
    Learning,
    Supplement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Capital {
    #[serde(rename = "under_10k")]
    Under10k,
    #[serde(rename = "10k_to_50k")]
    From10kTo50k,
    #[serde(rename = "50k_to_100k")]
    From50kTo100k,
    #[serde(rename = "over_100k")]
    Over100k,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
    VeryAggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeFrequency {
    Weekly,
    BiWeekly,
    Monthly,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InvestorProfile {
    pub experience: Experience,
    pub goal: Goal,
    pub capital: Capital,
    pub risk_tolerance: RiskTolerance,
    pub frequency: TradeFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedStrategy {
    pub strategy: &'static PresetStrategy,
    pub fit_score: u32,
}

/// Profile fit out of 90: risk 30, experience 20, capital 15, frequency 15, goal 10.
pub fn fit_score(strategy: &PresetStrategy, profile: &InvestorProfile) -> u32 {
    let risk = strategy.risk_level;
    let dte = strategy.days_to_expiry;
    let cash = strategy.initial_cash;
    let mut fit = 0;

    let risk_fits = match profile.risk_tolerance {
        RiskTolerance::Conservative => risk <= 2,
        RiskTolerance::Moderate => (2..=3).contains(&risk),
        RiskTolerance::Aggressive => (3..=4).contains(&risk),
        RiskTolerance::VeryAggressive => risk >= 4,
    };
    if risk_fits {
        fit += 30;
    }

    let capital_fits = match profile.capital {
        Capital::Under10k => cash <= 50_000.0,
        Capital::From10kTo50k => cash <= 75_000.0,
        Capital::From50kTo100k => true,
        Capital::Over100k => cash >= 100_000.0,
    };
    if capital_fits {
        fit += 15;
    }

    let experience_fits = match profile.experience {
        Experience::Beginner => risk <= 2,
        Experience::Basics => risk <= 3,
        Experience::Intermediate => risk <= 4,
        Experience::Advanced => true,
    };
    if experience_fits {
        fit += 20;
    }

    let frequency_fits = match profile.frequency {
        TradeFrequency::Weekly => dte <= 10,
        TradeFrequency::BiWeekly => (10..=21).contains(&dte),
        TradeFrequency::Monthly => dte >= 21,
        TradeFrequency::Flexible => false,
    };
    if frequency_fits {
        fit += 15;
    }

    let goal_fits = match profile.goal {
        Goal::Income => risk <= 3,
        Goal::Growth => (2..=4).contains(&risk),
        Goal::Learning => risk <= 2,
        Goal::Supplement => false,
    };
    if goal_fits {
        fit += 10;
    }

    fit
}

/// Presets ranked by fit, best first; catalogue order without a profile.
pub fn recommend(profile: Option<&InvestorProfile>) -> Vec<RankedStrategy> {
    let mut ranked: Vec<RankedStrategy> = PRESETS
        .iter()
        .map(|strategy| RankedStrategy {
            strategy,
            fit_score: profile.map_or(0, |profile| fit_score(strategy, profile)),
        })
        .collect();
    ranked.sort_by(|a, b| b.fit_score.cmp(&a.fit_score));
    ranked
}
