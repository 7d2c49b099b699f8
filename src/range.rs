use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::subject::ParseLevelError;

/// Granularity of a plan view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Daily => "daily",
            ViewMode::Weekly => "weekly",
            ViewMode::Monthly => "monthly",
        }
    }
}

impl FromStr for ViewMode {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(ViewMode::Daily),
            "weekly" | "week" => Ok(ViewMode::Weekly),
            "monthly" | "month" => Ok(ViewMode::Monthly),
            _ => Err(ParseLevelError::new("view mode", s, "daily, weekly, monthly")),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Inclusive span of whole days: `start` is midnight of the first day and
/// `end` is 23:59:59.999 of the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    fn spanning(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: first.and_time(NaiveTime::MIN),
            end: last.and_time(END_OF_DAY),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    /// Each calendar day in the range, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = self.first_day();
        while current <= self.last_day() {
            days.push(current);
            current = current + Duration::days(1);
        }
        days
    }
}

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
    Some(time) => time,
    None => panic!("23:59:59.999 is a valid time"),
};

/// Day, Sunday-started week, or calendar month containing `reference`.
pub fn resolve_range(mode: ViewMode, reference: NaiveDate) -> DateRange {
    match mode {
        ViewMode::Daily => DateRange::spanning(reference, reference),
        ViewMode::Weekly => {
            let offset = reference.weekday().num_days_from_sunday() as i64;
            let start = reference - Duration::days(offset);
            DateRange::spanning(start, start + Duration::days(6))
        }
        ViewMode::Monthly => {
            let start = reference.with_day(1).unwrap_or(reference);
            let end = start
                .checked_add_months(Months::new(1))
                .map(|next| next - Duration::days(1))
                .unwrap_or(start);
            DateRange::spanning(start, end)
        }
    }
}

/// Moves the reference date one view-width forward or back. Month steps clamp
/// to the last day of a shorter month.
pub fn navigate(mode: ViewMode, reference: NaiveDate, direction: Direction) -> NaiveDate {
    let forward = direction == Direction::Next;
    match mode {
        ViewMode::Daily | ViewMode::Weekly => {
            let step = if mode == ViewMode::Daily { 1 } else { 7 };
            let days = if forward { step } else { -step };
            reference + Duration::days(days)
        }
        ViewMode::Monthly => {
            let shifted = if forward {
                reference.checked_add_months(Months::new(1))
            } else {
                reference.checked_sub_months(Months::new(1))
            };
            shifted.unwrap_or(reference)
        }
    }
}
