//! Study streaks over a daily consistency sequence.

use serde::{Deserialize, Serialize};

use super::totals::DailyStudy;

/// Streak information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    /// Consecutive studied days ending at the most recent day
    pub current_streak: usize,
    /// Longest run of studied days anywhere in the sequence
    pub longest_streak: usize,
    /// Number of studied days
    pub total_days: usize,
}

/// Compute streaks from days ordered oldest to newest.
///
/// If the most recent day was not studied the current streak is 0, however
/// long the earlier runs were.
#[must_use]
pub fn compute_streaks(days: &[DailyStudy]) -> StreakInfo {
    let current_streak = days.iter().rev().take_while(|d| d.studied).count();

    let mut longest_streak = 0;
    let mut run = 0;
    for day in days {
        if day.studied {
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 0;
        }
    }

    StreakInfo {
        current_streak,
        longest_streak,
        total_days: days.iter().filter(|d| d.studied).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn days(pattern: &[bool]) -> Vec<DailyStudy> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        pattern
            .iter()
            .enumerate()
            .map(|(i, &studied)| DailyStudy {
                date: start + Duration::days(i as i64),
                total_minutes: if studied { 30 } else { 0 },
                studied,
            })
            .collect()
    }

    #[test]
    fn test_streak_empty() {
        assert_eq!(compute_streaks(&[]), StreakInfo::default());
    }

    #[test]
    fn test_all_false() {
        let streak = compute_streaks(&days(&[false; 5]));
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 0);
        assert_eq!(streak.total_days, 0);
    }

    #[test]
    fn test_all_true() {
        let streak = compute_streaks(&days(&[true; 7]));
        assert_eq!(streak.current_streak, 7);
        assert_eq!(streak.longest_streak, 7);
        assert_eq!(streak.total_days, 7);
    }

    #[test]
    fn test_trailing_run() {
        let streak = compute_streaks(&days(&[true, true, false, true, true, true]));
        assert_eq!(streak.current_streak, 3);
        assert_eq!(streak.longest_streak, 3);
        assert_eq!(streak.total_days, 5);
    }

    #[test]
    fn test_broken_today_resets_current() {
        let streak = compute_streaks(&days(&[true, true, true, true, false]));
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 4);
        assert_eq!(streak.total_days, 4);
    }
}
