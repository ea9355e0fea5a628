use crate::value_objects::price_bar::PriceBar;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct BarQualityReport {
    pub duplicates: usize,
    pub out_of_order: usize,
    pub invalid_close: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub first_duplicate: Option<NaiveDate>,
    pub first_out_of_order: Option<NaiveDate>,
    pub first_invalid_close: Option<NaiveDate>,
}

impl BarQualityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0 && self.out_of_order == 0 && self.invalid_close == 0
    }
}

pub fn bar_quality(bars: &[PriceBar]) -> BarQualityReport {
    let mut report = BarQualityReport::default();
    if bars.is_empty() {
        return report;
    }

    report.first_date = Some(bars[0].date);
    let mut last_date: Option<NaiveDate> = None;

    for bar in bars {
        if !bar.has_valid_close() {
            report.invalid_close += 1;
            if report.first_invalid_close.is_none() {
                report.first_invalid_close = Some(bar.date);
            }
        }

        if let Some(prev) = last_date {
            if bar.date == prev {
                report.duplicates += 1;
                if report.first_duplicate.is_none() {
                    report.first_duplicate = Some(bar.date);
                }
            } else if bar.date < prev {
                report.out_of_order += 1;
                if report.first_out_of_order.is_none() {
                    report.first_out_of_order = Some(bar.date);
                }
            }
        }

        last_date = Some(bar.date);
        report.last_date = Some(bar.date);
    }

    report
}

/// Sorts bars by date, keeps the last bar seen for a repeated date and drops
/// invalid closes. The report describes the input before cleaning.
pub fn canonicalize(bars: Vec<PriceBar>) -> (Vec<PriceBar>, BarQualityReport) {
    let report = bar_quality(&bars);
    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
    for bar in bars {
        if !bar.has_valid_close() {
            continue;
        }
        by_date.insert(bar.date, bar);
    }
    (by_date.into_values().collect(), report)
}

#[cfg(test)]
mod tests {
    use super::{bar_quality, canonicalize};
    use crate::value_objects::price_bar::PriceBar;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar::close_only(
            NaiveDate::from_ymd_opt(2025, 1, day).expect("valid date"),
            close,
        )
    }

    #[test]
    fn detects_duplicates_out_of_order_and_invalid_closes() {
        let bars = vec![bar(2, 10.0), bar(2, 11.0), bar(1, 9.0), bar(3, -1.0)];
        let report = bar_quality(&bars);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.out_of_order, 1);
        assert_eq!(report.invalid_close, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn canonicalize_sorts_and_keeps_last_duplicate() {
        let bars = vec![bar(3, 12.0), bar(1, 10.0), bar(3, 13.0), bar(2, f64::NAN)];
        let (clean, report) = canonicalize(bars);
        assert_eq!(report.out_of_order, 2);
        assert_eq!(report.invalid_close, 1);
        assert_eq!(clean.len(), 2);
        assert!(clean.windows(2).all(|w| w[0].date < w[1].date));
        assert!((clean[1].close - 13.0).abs() < 1e-12);
        assert!(bar_quality(&clean).is_clean());
    }
}
