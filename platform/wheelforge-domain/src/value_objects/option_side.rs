use crate::value_objects::trade::TradeKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Put,
    Call,
}

impl OptionSide {
    /// Strike placed `otm_pct` away from spot on the out-of-the-money side.
    pub fn otm_strike(self, spot: f64, otm_pct: f64) -> f64 {
        match self {
            Self::Put => spot * (1.0 - otm_pct),
            Self::Call => spot * (1.0 + otm_pct),
        }
    }

    /// A short put is assigned when expiry closes strictly below the strike,
    /// a covered call when it closes strictly above.
    pub fn is_assigned(self, strike: f64, close_at_expiry: f64) -> bool {
        match self {
            Self::Put => close_at_expiry < strike,
            Self::Call => close_at_expiry > strike,
        }
    }

    pub fn sell_kind(self) -> TradeKind {
        match self {
            Self::Put => TradeKind::SellPut,
            Self::Call => TradeKind::SellCall,
        }
    }

    pub fn assigned_kind(self) -> TradeKind {
        match self {
            Self::Put => TradeKind::PutAssigned,
            Self::Call => TradeKind::CallAssigned,
        }
    }
}
