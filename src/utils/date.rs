//! Week-of-year conversions for the 48-week occurrence calendar.
//!
//! Each month is split into four weeks: days 1-7, 8-14, 15-21 and 22-end.

use crate::constants::occurrence::{DAYS_PER_WEEK, WEEKS_PER_MONTH, WEEKS_PER_YEAR};
use chrono::{Datelike, Local, NaiveDate};

/// Convert month/day to a week number (1-48).
///
/// `week = (month - 1) * 4 + min(4, (day - 1) / 7 + 1)`
///
/// Does not validate month/day combinations; out-of-range input is clamped
/// into 1-48.
pub fn date_to_week(month: u32, day: u32) -> u32 {
    let month = month.clamp(1, 12);
    let week_in_month = (day.max(1) - 1) / DAYS_PER_WEEK + 1;

    ((month - 1) * WEEKS_PER_MONTH + week_in_month.min(WEEKS_PER_MONTH)).min(WEEKS_PER_YEAR)
}

/// Week number (1-48) of a calendar date.
pub fn week_of(date: NaiveDate) -> u32 {
    date_to_week(date.month(), date.day())
}

/// Week number (1-48) of today's local date.
pub fn current_week() -> u32 {
    week_of(Local::now().date_naive())
}

/// First (month, day) of a week number.
///
/// Week 1 is January 1st, week 18 is May 8th, week 48 is December 22nd.
pub fn week_to_month_day(week: u32) -> (u32, u32) {
    let index = week.clamp(1, WEEKS_PER_YEAR) - 1;
    let month = index / WEEKS_PER_MONTH + 1;
    let day = (index % WEEKS_PER_MONTH) * DAYS_PER_WEEK + 1;
    (month, day)
}

/// Whether `week` is a valid week number.
pub fn is_valid_week(week: u32) -> bool {
    (1..=WEEKS_PER_YEAR).contains(&week)
}
