//! Calendar helpers for monthly time axes.
//!
//! Everything here works on `jiff::civil::Date` directly with plain integer
//! arithmetic: month offsets for growth matrices, Rata Die day numbers for
//! interpolation between dated key points, no `Span` normalisation involved.

use jiff::civil::Date;

/// Fast leap year check.
#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Fast inline days-in-month calculation without creating a `jiff::civil::Date`.
#[inline]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    const DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Convert a civil date to a Rata Die day number (days since 0001-01-01).
///
/// Uses the proleptic Gregorian calendar algorithm from Baum (2017).
#[inline]
fn rata_die(d: Date) -> i32 {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    // Shift March = month 1 so Feb (end of "year") is month 12
    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Number of days between two dates (d2 - d1), positive when `d2 > d1`.
#[inline]
pub fn fast_days_between(d1: Date, d2: Date) -> i32 {
    rata_die(d2) - rata_die(d1)
}

/// Whole calendar months from `from` to `to`.
///
/// A partial month does not count: 2020-01-15 → 2020-03-01 is one month.
/// Negative when `to` precedes `from`.
pub fn months_between(from: Date, to: Date) -> i32 {
    if to < from {
        return -months_between(to, from);
    }
    let mut months =
        (to.year() as i32 - from.year() as i32) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

/// Shift a date by `n` calendar months, clamping the day to the target month's length.
pub fn add_months(d: Date, n: i32) -> Date {
    let zero_based = d.year() as i32 * 12 + (d.month() as i32 - 1) + n;
    let year = zero_based.div_euclid(12) as i16;
    let month = (zero_based.rem_euclid(12) + 1) as i8;
    let day = d.day().min(days_in_month(year, month));
    jiff::civil::date(year, month, day)
}

#[inline]
pub fn is_month_start(d: Date) -> bool {
    d.day() == 1
}

#[inline]
pub fn truncate_to_month_start(d: Date) -> Date {
    jiff::civil::date(d.year(), d.month(), 1)
}
