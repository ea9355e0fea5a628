use crate::entities::simulation::LegRecord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakStats {
    pub max_win_streak: u32,
    pub max_loss_streak: u32,
    /// Positive for a run of expired legs, negative for a run of assignments.
    pub current_streak: i32,
}

/// Runs of consecutive expired (win) and assigned (loss) legs.
pub fn streaks(legs: &[LegRecord]) -> StreakStats {
    let mut stats = StreakStats::default();
    let mut run = 0u32;
    let mut last_was_loss: Option<bool> = None;

    for leg in legs {
        let loss = leg.is_assigned();
        run = if last_was_loss == Some(loss) { run + 1 } else { 1 };
        last_was_loss = Some(loss);

        let signed = i32::try_from(run).unwrap_or(i32::MAX);
        if loss {
            stats.max_loss_streak = stats.max_loss_streak.max(run);
            stats.current_streak = -signed;
        } else {
            stats.max_win_streak = stats.max_win_streak.max(run);
            stats.current_streak = signed;
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::streaks;
    use crate::entities::simulation::{LegOutcome, LegRecord};
    use crate::value_objects::option_side::OptionSide;
    use chrono::NaiveDate;

    fn legs(outcomes: &[LegOutcome]) -> Vec<LegRecord> {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).expect("date");
        outcomes
            .iter()
            .map(|outcome| LegRecord {
                side: OptionSide::Call,
                opened: date,
                expired: date,
                strike: 10.0,
                premium: 1.0,
                underlying_at_open: 10.0,
                underlying_at_expiry: 10.0,
                outcome: *outcome,
            })
            .collect()
    }

    #[test]
    fn tracks_longest_runs_and_current_sign() {
        use LegOutcome::{Assigned as L, Expired as W};
        let stats = streaks(&legs(&[W, W, W, L, L, W, L, L, L, L, W, W]));
        assert_eq!(stats.max_win_streak, 3);
        assert_eq!(stats.max_loss_streak, 4);
        assert_eq!(stats.current_streak, 2);

        let stats = streaks(&legs(&[W, L, L]));
        assert_eq!(stats.current_streak, -2);
    }

    #[test]
    fn no_legs_no_streaks() {
        assert_eq!(streaks(&[]), Default::default());
    }
}
