use crate::value_objects::option_side::OptionSide;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    SellPut,
    PutAssigned,
    SellCall,
    CallAssigned,
}

impl TradeKind {
    pub fn is_sell(self) -> bool {
        matches!(self, Self::SellPut | Self::SellCall)
    }

    pub fn is_assignment(self) -> bool {
        matches!(self, Self::PutAssigned | Self::CallAssigned)
    }

    pub fn side(self) -> OptionSide {
        match self {
            Self::SellPut | Self::PutAssigned => OptionSide::Put,
            Self::SellCall | Self::CallAssigned => OptionSide::Call,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub kind: TradeKind,
    pub strike: f64,
    /// `None` for assignment events.
    pub premium: Option<f64>,
    pub underlying_price: f64,
}
