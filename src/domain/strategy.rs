//! Contribution strategy catalog.
//!
//! Maps a detected [`Granularity`] to the contribution frequencies worth
//! comparing for that kind of data, finest first.

use crate::domain::frequency::Frequency;
use crate::domain::granularity::Granularity;

/// Upper bound on the number of strategies compared in one run.
pub const MAX_DISPLAY_STRATEGIES: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    label: &'static str,
    interval_hours: f64,
    frequency: Frequency,
}

impl Strategy {
    fn from_frequency(frequency: Frequency) -> Self {
        Self {
            label: frequency.label(),
            interval_hours: frequency.interval_hours(),
            frequency,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn interval_hours(&self) -> f64 {
        self.interval_hours
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }
}

fn frequencies_for(granularity: Granularity) -> &'static [Frequency] {
    use Frequency::*;

    match granularity {
        Granularity::IntradayMinute => &[
            HalfHourly,
            Hourly,
            ThreeHourly,
            SixHourly,
            TwelveHourly,
            Daily,
            ThreeDaily,
            Weekly,
        ],
        Granularity::IntradayHourly => &[
            Hourly,
            ThreeHourly,
            SixHourly,
            TwelveHourly,
            Daily,
            ThreeDaily,
            Weekly,
        ],
        Granularity::IntradayHalfDay => &[TwelveHourly, Daily, ThreeDaily, Weekly, Monthly],
        Granularity::Daily => &[Daily, ThreeDaily, Weekly, Monthly, Quarterly, Semiannually],
        Granularity::DailyPlus | Granularity::Unknown => {
            &[Weekly, Monthly, Quarterly, Semiannually, Yearly]
        }
    }
}

/// Ordered strategies (ascending interval) offered for `granularity`.
pub fn strategies_for(granularity: Granularity) -> Vec<Strategy> {
    frequencies_for(granularity)
        .iter()
        .copied()
        .map(Strategy::from_frequency)
        .collect()
}

/// Reduce `items` to at most `max_count` entries.
///
/// Lists that already fit are returned unchanged. Longer lists keep the
/// entries at `floor(i * len / max_count)` for `i` in `0..max_count`.
pub fn select_display_set<T: Clone>(items: &[T], max_count: usize) -> Vec<T> {
    if items.len() <= max_count {
        return items.to_vec();
    }
    (0..max_count)
        .map(|i| items[i * items.len() / max_count].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(strategies: &[Strategy]) -> Vec<&'static str> {
        strategies.iter().map(|s| s.frequency().code()).collect()
    }

    #[test]
    fn minute_catalog() {
        assert_eq!(
            codes(&strategies_for(Granularity::IntradayMinute)),
            vec![
                "halfhourly",
                "hourly",
                "3hourly",
                "6hourly",
                "12hourly",
                "daily",
                "3daily",
                "weekly"
            ]
        );
    }

    #[test]
    fn hourly_catalog() {
        assert_eq!(
            codes(&strategies_for(Granularity::IntradayHourly)),
            vec!["hourly", "3hourly", "6hourly", "12hourly", "daily", "3daily", "weekly"]
        );
    }

    #[test]
    fn half_day_catalog() {
        assert_eq!(
            codes(&strategies_for(Granularity::IntradayHalfDay)),
            vec!["12hourly", "daily", "3daily", "weekly", "monthly"]
        );
    }

    #[test]
    fn daily_catalog() {
        assert_eq!(
            codes(&strategies_for(Granularity::Daily)),
            vec!["daily", "3daily", "weekly", "monthly", "quarterly", "semiannually"]
        );
    }

    #[test]
    fn daily_plus_and_unknown_share_catalog() {
        let expected = vec!["weekly", "monthly", "quarterly", "semiannually", "yearly"];
        assert_eq!(codes(&strategies_for(Granularity::DailyPlus)), expected);
        assert_eq!(codes(&strategies_for(Granularity::Unknown)), expected);
    }

    #[test]
    fn catalog_sizes_and_ordering() {
        for g in Granularity::ALL {
            let list = strategies_for(g);
            assert!((5..=MAX_DISPLAY_STRATEGIES).contains(&list.len()), "{g}");
            assert!(
                list.windows(2)
                    .all(|w| w[0].interval_hours() < w[1].interval_hours()),
                "{g}"
            );
        }
    }

    #[test]
    fn strategy_carries_label_and_interval() {
        let list = strategies_for(Granularity::IntradayMinute);
        assert_eq!(list[0].label(), "Every 30 minutes");
        assert_eq!(list[0].interval_hours(), 0.5);
        assert_eq!(list[7].label(), "Weekly");
        assert_eq!(list[7].interval_hours(), 168.0);
    }

    #[test]
    fn display_set_of_eight_unchanged() {
        let list = strategies_for(Granularity::IntradayMinute);
        assert_eq!(select_display_set(&list, MAX_DISPLAY_STRATEGIES), list);
    }

    #[test]
    fn display_set_of_five_unchanged() {
        let list = strategies_for(Granularity::DailyPlus);
        assert_eq!(select_display_set(&list, MAX_DISPLAY_STRATEGIES), list);
    }

    #[test]
    fn display_set_of_twelve_uses_floor_indices() {
        let items: Vec<usize> = (0..12).collect();
        assert_eq!(
            select_display_set(&items, 8),
            vec![0, 1, 3, 4, 6, 7, 9, 10]
        );
    }

    #[test]
    fn display_set_of_nine_keeps_first_eight() {
        let items: Vec<usize> = (0..9).collect();
        assert_eq!(select_display_set(&items, 8), (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn display_set_with_smaller_bound() {
        let list = strategies_for(Granularity::Daily);
        let picked = select_display_set(&list, 3);
        // len 6 -> indices 0, 2, 4
        assert_eq!(codes(&picked), vec!["daily", "weekly", "quarterly"]);
    }

    #[test]
    fn display_set_zero_bound_is_empty() {
        let items = vec![1, 2, 3];
        assert!(select_display_set(&items, 0).is_empty());
    }
}
