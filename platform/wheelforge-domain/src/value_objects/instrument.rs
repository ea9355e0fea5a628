use serde::{Deserialize, Serialize};

/// Parameters driving the synthetic GBM generator for one instrument.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentProfile {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sector: String,
    pub spot: f64,
    pub annual_volatility: f64,
    pub annual_drift: f64,
}

const BUILTIN: [(&str, &str, &str, f64, f64, f64); 8] = [
    ("SPY", "S&P 500 ETF", "Index", 585.0, 0.16, 0.08),
    ("AAPL", "Apple Inc.", "Tech", 230.0, 0.28, 0.10),
    ("TSLA", "Tesla Inc.", "Growth", 350.0, 0.55, 0.05),
    ("MSFT", "Microsoft Corp.", "Tech", 430.0, 0.24, 0.12),
    ("NVDA", "NVIDIA Corp.", "Tech", 140.0, 0.50, 0.15),
    ("AMD", "AMD Inc.", "Tech", 160.0, 0.45, 0.08),
    ("AMZN", "Amazon.com", "Tech", 210.0, 0.30, 0.11),
    ("META", "Meta Platforms", "Tech", 590.0, 0.35, 0.13),
];

impl InstrumentProfile {
    pub fn builtin() -> Vec<InstrumentProfile> {
        BUILTIN
            .iter()
            .map(|(symbol, name, sector, spot, vol, drift)| InstrumentProfile {
                symbol: symbol.to_string(),
                name: name.to_string(),
                sector: sector.to_string(),
                spot: *spot,
                annual_volatility: *vol,
                annual_drift: *drift,
            })
            .collect()
    }

    /// Built-in profile for `symbol`, or a generic 100 / 30% vol / 7% drift profile.
    pub fn lookup(symbol: &str) -> InstrumentProfile {
        let wanted = symbol.trim().to_uppercase();
        Self::builtin()
            .into_iter()
            .find(|profile| profile.symbol == wanted)
            .unwrap_or_else(|| InstrumentProfile {
                symbol: wanted,
                name: String::new(),
                sector: String::new(),
                spot: 100.0,
                annual_volatility: 0.30,
                annual_drift: 0.07,
            })
    }
}
