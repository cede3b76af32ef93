//! Contribution frequencies and calendar stepping.
//!
//! Each frequency maps to a [`Step`]: either a fixed duration or a number of
//! calendar months. Month steps that land on a day the target month does not
//! have fall back to day 1 of that month; they never roll into the following
//! month and never clamp to the month's last day.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frequency {
    HalfHourly,
    Hourly,
    ThreeHourly,
    SixHourly,
    TwelveHourly,
    Daily,
    ThreeDaily,
    Weekly,
    Monthly,
    Quarterly,
    Semiannually,
    Yearly,
}

/// How a cursor moves forward for one contribution period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fixed(Duration),
    Months(u32),
}

impl Frequency {
    pub const ALL: [Frequency; 12] = [
        Frequency::HalfHourly,
        Frequency::Hourly,
        Frequency::ThreeHourly,
        Frequency::SixHourly,
        Frequency::TwelveHourly,
        Frequency::Daily,
        Frequency::ThreeDaily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Semiannually,
        Frequency::Yearly,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Frequency::HalfHourly => "halfhourly",
            Frequency::Hourly => "hourly",
            Frequency::ThreeHourly => "3hourly",
            Frequency::SixHourly => "6hourly",
            Frequency::TwelveHourly => "12hourly",
            Frequency::Daily => "daily",
            Frequency::ThreeDaily => "3daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Semiannually => "semiannually",
            Frequency::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::HalfHourly => "Every 30 minutes",
            Frequency::Hourly => "Hourly",
            Frequency::ThreeHourly => "Every 3 hours",
            Frequency::SixHourly => "Every 6 hours",
            Frequency::TwelveHourly => "Every 12 hours",
            Frequency::Daily => "Daily",
            Frequency::ThreeDaily => "Every 3 days",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::Semiannually => "Semiannually",
            Frequency::Yearly => "Yearly",
        }
    }

    /// Nominal period length in hours. Calendar frequencies use a 30-day
    /// month and a 365-day year.
    pub fn interval_hours(&self) -> f64 {
        match self {
            Frequency::HalfHourly => 0.5,
            Frequency::Hourly => 1.0,
            Frequency::ThreeHourly => 3.0,
            Frequency::SixHourly => 6.0,
            Frequency::TwelveHourly => 12.0,
            Frequency::Daily => 24.0,
            Frequency::ThreeDaily => 72.0,
            Frequency::Weekly => 168.0,
            Frequency::Monthly => 720.0,
            Frequency::Quarterly => 2160.0,
            Frequency::Semiannually => 4320.0,
            Frequency::Yearly => 8760.0,
        }
    }

    pub fn step(&self) -> Step {
        match self {
            Frequency::HalfHourly => Step::Fixed(Duration::minutes(30)),
            Frequency::Hourly => Step::Fixed(Duration::hours(1)),
            Frequency::ThreeHourly => Step::Fixed(Duration::hours(3)),
            Frequency::SixHourly => Step::Fixed(Duration::hours(6)),
            Frequency::TwelveHourly => Step::Fixed(Duration::hours(12)),
            Frequency::Daily => Step::Fixed(Duration::days(1)),
            Frequency::ThreeDaily => Step::Fixed(Duration::days(3)),
            Frequency::Weekly => Step::Fixed(Duration::days(7)),
            Frequency::Monthly => Step::Months(1),
            Frequency::Quarterly => Step::Months(3),
            Frequency::Semiannually => Step::Months(6),
            Frequency::Yearly => Step::Months(12),
        }
    }

    /// Next contribution time after `from`, or `None` past the end of the
    /// representable calendar.
    pub fn advance(&self, from: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.step() {
            Step::Fixed(d) => from.checked_add_signed(d),
            Step::Months(n) => add_months_clamped(from, n),
        }
    }
}

/// Add `months` calendar months, carrying into the year. When the day does
/// not exist in the target month the result is day 1 of that month.
/// Returns `None` when the target month is outside chrono's date range.
pub fn add_months_clamped(from: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    let total = from.month0().checked_add(months)?;
    let year = from.year().checked_add(i32::try_from(total / 12).ok()?)?;
    let month = total % 12 + 1;

    let date = NaiveDate::from_ymd_opt(year, month, from.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 1))?;
    Some(date.and_time(from.time()))
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown frequency code: {0}")]
pub struct ParseFrequencyError(pub String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Frequency::ALL
            .into_iter()
            .find(|f| f.code() == wanted)
            .ok_or_else(|| ParseFrequencyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn fixed_steps() {
        let start = at(2024, 3, 10, 9, 30);
        assert_eq!(Frequency::HalfHourly.advance(start).unwrap(), at(2024, 3, 10, 10, 0));
        assert_eq!(Frequency::Hourly.advance(start).unwrap(), at(2024, 3, 10, 10, 30));
        assert_eq!(Frequency::ThreeHourly.advance(start).unwrap(), at(2024, 3, 10, 12, 30));
        assert_eq!(Frequency::SixHourly.advance(start).unwrap(), at(2024, 3, 10, 15, 30));
        assert_eq!(Frequency::TwelveHourly.advance(start).unwrap(), at(2024, 3, 10, 21, 30));
        assert_eq!(Frequency::Daily.advance(start).unwrap(), at(2024, 3, 11, 9, 30));
        assert_eq!(Frequency::ThreeDaily.advance(start).unwrap(), at(2024, 3, 13, 9, 30));
        assert_eq!(Frequency::Weekly.advance(start).unwrap(), at(2024, 3, 17, 9, 30));
    }

    #[test]
    fn monthly_from_31st_clamps_to_first_of_next_month() {
        // February has no 31st
        assert_eq!(
            Frequency::Monthly.advance(at(2023, 1, 31, 0, 0)).unwrap(),
            at(2023, 2, 1, 0, 0)
        );
        assert_eq!(
            Frequency::Monthly.advance(at(2024, 3, 31, 14, 0)).unwrap(),
            at(2024, 4, 1, 14, 0)
        );
    }

    #[test]
    fn monthly_keeps_day_when_valid() {
        assert_eq!(
            Frequency::Monthly.advance(at(2024, 1, 15, 0, 0)).unwrap(),
            at(2024, 2, 15, 0, 0)
        );
        assert_eq!(
            Frequency::Monthly.advance(at(2024, 1, 29, 0, 0)).unwrap(),
            at(2024, 2, 29, 0, 0)
        );
    }

    #[test]
    fn monthly_rolls_over_year() {
        assert_eq!(
            Frequency::Monthly.advance(at(2023, 12, 31, 0, 0)).unwrap(),
            at(2024, 1, 31, 0, 0)
        );
    }

    #[test]
    fn quarterly_and_semiannual_carry_and_clamp() {
        assert_eq!(
            Frequency::Quarterly.advance(at(2023, 11, 30, 0, 0)).unwrap(),
            at(2024, 2, 1, 0, 0)
        );
        assert_eq!(
            Frequency::Quarterly.advance(at(2024, 1, 31, 0, 0)).unwrap(),
            at(2024, 4, 1, 0, 0)
        );
        assert_eq!(
            Frequency::Semiannually.advance(at(2023, 8, 31, 0, 0)).unwrap(),
            at(2024, 2, 1, 0, 0)
        );
        assert_eq!(
            Frequency::Semiannually.advance(at(2023, 7, 15, 0, 0)).unwrap(),
            at(2024, 1, 15, 0, 0)
        );
        assert_eq!(
            Frequency::Semiannually.advance(at(2024, 6, 30, 0, 0)).unwrap(),
            at(2024, 12, 30, 0, 0)
        );
    }

    #[test]
    fn yearly_leap_day_clamps_to_first() {
        assert_eq!(
            Frequency::Yearly.advance(at(2024, 2, 29, 8, 0)).unwrap(),
            at(2025, 2, 1, 8, 0)
        );
        assert_eq!(
            Frequency::Yearly.advance(at(2024, 3, 5, 0, 0)).unwrap(),
            at(2025, 3, 5, 0, 0)
        );
    }

    #[test]
    fn code_and_label_tables() {
        assert_eq!(Frequency::ThreeHourly.code(), "3hourly");
        assert_eq!(Frequency::ThreeDaily.to_string(), "3daily");
        assert_eq!(Frequency::HalfHourly.interval_hours(), 0.5);
        assert_eq!(Frequency::Yearly.label(), "Yearly");
    }

    #[test]
    fn parse_codes() {
        for f in Frequency::ALL {
            assert_eq!(f.code().parse::<Frequency>(), Ok(f));
        }
        assert_eq!("WEEKLY".parse::<Frequency>(), Ok(Frequency::Weekly));
        assert!("biweekly".parse::<Frequency>().is_err());
    }

    #[test]
    fn all_is_ordered_by_interval() {
        let hours: Vec<f64> = Frequency::ALL.iter().map(|f| f.interval_hours()).collect();
        assert!(hours.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn advance_past_calendar_end_is_none() {
        let last = NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap();
        let near_end = last - Duration::days(3);
        assert_eq!(Frequency::Weekly.advance(near_end), None);
        assert_eq!(
            Frequency::Daily.advance(near_end),
            Some(near_end + Duration::days(1))
        );
        assert_eq!(Frequency::Monthly.advance(last - Duration::days(10)), None);
        assert_eq!(Frequency::Yearly.advance(last - Duration::days(300)), None);
    }

    proptest! {
        #[test]
        fn advance_always_moves_forward(
            days in 0i64..40_000,
            minutes in 0i64..1440,
            idx in 0usize..12,
        ) {
            let from = at(1950, 1, 1, 0, 0) + Duration::days(days) + Duration::minutes(minutes);
            let next = Frequency::ALL[idx].advance(from).unwrap();
            prop_assert!(next > from);
        }

        #[test]
        fn month_steps_land_in_target_month(
            days in 0i64..40_000,
            months in 1u32..=12,
        ) {
            let from = at(1950, 1, 1, 0, 0) + Duration::days(days);
            let next = add_months_clamped(from, months).unwrap();
            let expected_index = from.year() * 12 + from.month0() as i32 + months as i32;
            prop_assert_eq!(next.year() * 12 + next.month0() as i32, expected_index);
            prop_assert!(next.day() == from.day() || next.day() == 1);
            prop_assert_eq!(next.time(), from.time());
        }
    }
}
