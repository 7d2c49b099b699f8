use chrono::{NaiveDate, NaiveTime, Timelike};
use study_planner::{Direction, ViewMode, navigate, resolve_range};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn daily_range_covers_the_whole_day() {
    let range = resolve_range(ViewMode::Daily, d(2026, 3, 11));

    assert_eq!(range.start, d(2026, 3, 11).and_time(NaiveTime::MIN));
    assert_eq!(range.end.date(), d(2026, 3, 11));
    assert_eq!(
        (range.end.hour(), range.end.minute(), range.end.second()),
        (23, 59, 59)
    );
    assert_eq!(range.end.nanosecond(), 999_000_000);
    assert_eq!(range.days(), vec![d(2026, 3, 11)]);
}

#[test]
fn weekly_range_starts_on_sunday() {
    // 2026-03-11 is a Wednesday.
    let range = resolve_range(ViewMode::Weekly, d(2026, 3, 11));
    assert_eq!(range.first_day(), d(2026, 3, 8));
    assert_eq!(range.last_day(), d(2026, 3, 14));
    assert_eq!(range.days().len(), 7);

    let from_sunday = resolve_range(ViewMode::Weekly, d(2026, 3, 8));
    let from_saturday = resolve_range(ViewMode::Weekly, d(2026, 3, 14));
    assert_eq!(from_sunday, range);
    assert_eq!(from_saturday, range);
}

#[test]
fn weekly_range_can_span_two_months() {
    let range = resolve_range(ViewMode::Weekly, d(2026, 4, 1));
    assert_eq!(range.first_day(), d(2026, 3, 29));
    assert_eq!(range.last_day(), d(2026, 4, 4));
    assert!(range.contains(d(2026, 3, 31)));
    assert!(!range.contains(d(2026, 4, 5)));
}

#[test]
fn monthly_range_ends_on_the_last_calendar_day() {
    let feb = resolve_range(ViewMode::Monthly, d(2026, 2, 15));
    assert_eq!(feb.first_day(), d(2026, 2, 1));
    assert_eq!(feb.last_day(), d(2026, 2, 28));

    let leap_feb = resolve_range(ViewMode::Monthly, d(2028, 2, 10));
    assert_eq!(leap_feb.last_day(), d(2028, 2, 29));

    let dec = resolve_range(ViewMode::Monthly, d(2026, 12, 5));
    assert_eq!(dec.first_day(), d(2026, 12, 1));
    assert_eq!(dec.last_day(), d(2026, 12, 31));
    assert_eq!(dec.days().len(), 31);
}

#[test]
fn navigation_steps_by_view_width() {
    let reference = d(2026, 3, 11);
    assert_eq!(navigate(ViewMode::Daily, reference, Direction::Next), d(2026, 3, 12));
    assert_eq!(navigate(ViewMode::Daily, reference, Direction::Prev), d(2026, 3, 10));
    assert_eq!(navigate(ViewMode::Weekly, reference, Direction::Next), d(2026, 3, 18));
    assert_eq!(navigate(ViewMode::Weekly, reference, Direction::Prev), d(2026, 3, 4));
    assert_eq!(navigate(ViewMode::Monthly, reference, Direction::Next), d(2026, 4, 11));
    assert_eq!(navigate(ViewMode::Monthly, reference, Direction::Prev), d(2026, 2, 11));
}

#[test]
fn month_navigation_clamps_to_shorter_months() {
    assert_eq!(
        navigate(ViewMode::Monthly, d(2026, 1, 31), Direction::Next),
        d(2026, 2, 28)
    );
    assert_eq!(
        navigate(ViewMode::Monthly, d(2026, 3, 31), Direction::Prev),
        d(2026, 2, 28)
    );
    assert_eq!(
        navigate(ViewMode::Monthly, d(2026, 12, 15), Direction::Next),
        d(2027, 1, 15)
    );
}

#[test]
fn view_mode_accepts_short_names() {
    assert_eq!("week".parse::<ViewMode>().unwrap(), ViewMode::Weekly);
    assert_eq!("Monthly".parse::<ViewMode>().unwrap(), ViewMode::Monthly);
    assert_eq!("day".parse::<ViewMode>().unwrap(), ViewMode::Daily);
    assert!("yearly".parse::<ViewMode>().is_err());
    assert_eq!(ViewMode::default(), ViewMode::Daily);
}
