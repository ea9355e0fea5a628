use crate::errors::SeriesError;
use crate::value_objects::price_bar::PriceBar;
use serde::Serialize;

/// Ordered daily bars plus the annualized volatility and drift that describe them.
///
/// Construction enforces the series invariant: at least one bar, strictly
/// increasing dates and positive finite closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
    volatility: f64,
    drift: f64,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>, volatility: f64, drift: f64) -> Result<Self, SeriesError> {
        if bars.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (idx, bar) in bars.iter().enumerate() {
            if !bar.has_valid_close() {
                return Err(SeriesError::InvalidClose(bar.date));
            }
            if idx > 0 {
                let prev = &bars[idx - 1];
                if bar.date == prev.date {
                    return Err(SeriesError::DuplicateDate(bar.date));
                }
                if bar.date < prev.date {
                    return Err(SeriesError::OutOfOrder(bar.date));
                }
            }
        }

        let volatility = if volatility.is_finite() {
            volatility.max(0.0)
        } else {
            0.0
        };
        let drift = if drift.is_finite() { drift } else { 0.0 };

        Ok(Self {
            bars,
            volatility,
            drift,
        })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|bar| bar.close)
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}
