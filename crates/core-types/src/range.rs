use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

/// A concrete, inclusive date window plus the token that produced it.
///
/// `None` on either side means "unbounded" on that side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub token: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>, token: Option<String>) -> Self {
        Self { from, to, token }
    }

    /// True when neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Resolves a named range token against `today`.
///
/// Rules, in priority order:
/// - blank token: explicit bounds pass through, token becomes `None`
/// - `custom`: explicit bounds pass through
/// - `all`: unbounded
/// - `today`, `this_month`, `last_month`: calendar windows around `today`
/// - a positive integer `N`: the trailing `N` days ending on (and including) `today`
/// - anything else: explicit bounds pass through, token kept as given
///
/// Unrecognised tokens are never an error.
pub fn resolve(
    token: Option<&str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> DateRange {
    let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => token,
        None => return DateRange::new(from, to, None),
    };
    let named = |from, to| DateRange::new(Some(from), Some(to), Some(token.to_string()));
    let passthrough = DateRange::new(from, to, Some(token.to_string()));

    match token {
        "custom" => passthrough,
        "all" => DateRange::new(None, None, Some(token.to_string())),
        "today" => named(today, today),
        "this_month" => match month_bounds(today) {
            Some((start, end)) => named(start, end),
            None => passthrough,
        },
        "last_month" => match today.checked_sub_months(Months::new(1)).and_then(month_bounds) {
            Some((start, end)) => named(start, end),
            None => passthrough,
        },
        other => match trailing_days(other, today) {
            Some(start) => named(start, today),
            None => passthrough,
        },
    }
}

/// First and last calendar day of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = day.with_day(1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Last calendar day of the month `months_back` months before `day`.
///
/// Month arithmetic clamps to the end of shorter months, so stepping back from
/// the 31st never spills into the following month.
pub fn month_end(day: NaiveDate, months_back: u32) -> Option<NaiveDate> {
    let shifted = day.checked_sub_months(Months::new(months_back))?;
    month_bounds(shifted).map(|(_, last)| last)
}

fn trailing_days(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let days: u64 = token.parse().ok()?;
    if days == 0 {
        return None;
    }
    today.checked_sub_days(Days::new(days - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn trailing_windows_include_today() {
        let today = date(2024, 5, 20);

        let week = resolve(Some("7"), None, None, today);
        assert_eq!(week.from, Some(date(2024, 5, 14)));
        assert_eq!(week.to, Some(today));
        assert_eq!(week.token.as_deref(), Some("7"));

        let month = resolve(Some("30"), None, None, today);
        assert_eq!(month.from, Some(date(2024, 4, 21)));
        assert_eq!(month.to, Some(today));
    }

    #[test]
    fn last_month_handles_year_and_leap_boundaries() {
        let january = resolve(Some("last_month"), None, None, date(2024, 1, 15));
        assert_eq!(january.from, Some(date(2023, 12, 1)));
        assert_eq!(january.to, Some(date(2023, 12, 31)));

        let march = resolve(Some("last_month"), None, None, date(2024, 3, 31));
        assert_eq!(march.from, Some(date(2024, 2, 1)));
        assert_eq!(march.to, Some(date(2024, 2, 29)));
    }

    #[test]
    fn this_month_and_today() {
        let today = date(2023, 2, 10);
        let month = resolve(Some("this_month"), None, None, today);
        assert_eq!((month.from, month.to), (Some(date(2023, 2, 1)), Some(date(2023, 2, 28))));

        let single = resolve(Some("today"), None, None, today);
        assert_eq!((single.from, single.to), (Some(today), Some(today)));
    }

    #[test]
    fn blank_custom_and_unknown_tokens_pass_bounds_through() {
        let today = date(2024, 6, 1);
        let (from, to) = (Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));

        assert_eq!(resolve(None, None, None, today), DateRange::default());
        assert_eq!(resolve(Some("  "), from, to, today), DateRange::new(from, to, None));

        let custom = resolve(Some("custom"), from, to, today);
        assert_eq!(custom, DateRange::new(from, to, Some("custom".into())));

        let unknown = resolve(Some("fortnight"), from, to, today);
        assert_eq!(unknown, DateRange::new(from, to, Some("fortnight".into())));

        let zero = resolve(Some("0"), from, to, today);
        assert_eq!((zero.from, zero.to), (from, to));
    }

    #[test]
    fn all_clears_explicit_bounds() {
        let today = date(2024, 6, 1);
        let all = resolve(Some("all"), Some(today), Some(today), today);
        assert!(all.is_unbounded());
        assert_eq!(all.token.as_deref(), Some("all"));
    }

    #[test]
    fn month_end_clamps_short_months() {
        assert_eq!(month_end(date(2024, 3, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(month_end(date(2024, 3, 31), 2), Some(date(2024, 1, 31)));
        assert_eq!(month_end(date(2024, 3, 5), 0), Some(date(2024, 3, 31)));
    }
}
