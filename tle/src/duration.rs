//! Calendar-aware `--duration` parsing (component of the CLI surface, §6).
//!
//! Accepts the unit set `{s, m, h, d, w, M, y}` with integer coefficients,
//! each unit occurring at most once, combined additively. `M`/`y` use real
//! calendar arithmetic (adding a month can change the day count; adding a
//! leap year doesn't), unlike the fixed-length units which are plain
//! seconds. This is the canonical reading chosen in the design notes over
//! the 30-day/365-day surrogate some source variants use.

use anyhow::{anyhow, bail, Result};
use time::{Date, Month, OffsetDateTime};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Components {
    years: u32,
    months: u32,
    weeks: u64,
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: u64,
}

/// Parses a duration spec like `"1y2M3d4h5m6s"` and returns `from` advanced
/// by it: years/months by calendar addition, everything else as a fixed
/// offset.
pub fn apply(spec: &str, from: OffsetDateTime) -> Result<OffsetDateTime> {
    let components = parse(spec)?;

    let advanced_date = add_calendar(from.date(), components.years, components.months)?;
    let advanced = advanced_date.with_time(from.time()).assume_offset(from.offset());

    let seconds_offset = components.seconds
        + components.minutes * 60
        + components.hours * 3600
        + components.days * 86400
        + components.weeks * 604800;

    Ok(advanced + time::Duration::seconds(seconds_offset as i64))
}

fn parse(spec: &str) -> Result<Components> {
    if spec.is_empty() {
        bail!("empty duration");
    }

    let mut components = Components::default();
    let mut seen = std::collections::HashSet::new();
    let mut chars = spec.chars().peekable();

    while chars.peek().is_some() {
        let mut digits = String::new();
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() {
                digits.push(*c);
                chars.next();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            bail!("expected a number before a duration unit in {spec:?}");
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| anyhow!("duration coefficient out of range in {spec:?}"))?;

        let unit = chars
            .next()
            .ok_or_else(|| anyhow!("duration unit missing after {digits} in {spec:?}"))?;

        if !seen.insert(unit) {
            bail!("duration unit '{unit}' repeated in {spec:?}");
        }

        match unit {
            'y' => components.years = value.try_into()?,
            'M' => components.months = value.try_into()?,
            'w' => components.weeks = value,
            'd' => components.days = value,
            'h' => components.hours = value,
            'm' => components.minutes = value,
            's' => components.seconds = value,
            other => bail!("unknown duration unit '{other}' in {spec:?}"),
        }
    }

    Ok(components)
}

/// Adds `years` and `months` to `date` using calendar semantics: the day
/// clamps to the target month's length (e.g. Jan 31 + 1 month = Feb 28/29).
fn add_calendar(date: Date, years: u32, months: u32) -> Result<Date> {
    let total_months = months as i64 + (date.month() as i64 - 1);
    let extra_years = total_months.div_euclid(12);
    let month_index = total_months.rem_euclid(12);

    let new_year = date.year() + years as i32 + extra_years as i32;
    let new_month = Month::try_from((month_index + 1) as u8).expect("0..12 maps to a valid month");

    let last_day = days_in_month(new_year, new_month);
    let new_day = date.day().min(last_day);

    Date::from_calendar_date(new_year, new_month, new_day)
        .map_err(|e| anyhow!("calendar overflow adding duration: {e}"))
}

fn days_in_month(year: i32, month: Month) -> u8 {
    use Month::*;
    match month {
        January | March | May | July | August | October | December => 31,
        April | June | September | November => 30,
        February => {
            let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            if leap {
                29
            } else {
                28
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn additive_over_all_units() {
        let from = datetime!(2024-01-01 0:00 UTC);
        let to = apply("1y2M3d4h5m6s", from).unwrap();
        // 2024 is a leap year; 2025-03-01 + 3 days = 2025-03-04.
        assert_eq!(to, datetime!(2025-03-04 4:05:06 UTC));
    }

    #[test]
    fn month_addition_clamps_day() {
        let from = datetime!(2024-01-31 0:00 UTC);
        let to = apply("1M", from).unwrap();
        assert_eq!(to, datetime!(2024-02-29 0:00 UTC));
    }

    #[test]
    fn year_addition_respects_leap_days() {
        let from = datetime!(2024-02-29 0:00 UTC);
        let to = apply("1y", from).unwrap();
        assert_eq!(to, datetime!(2025-02-28 0:00 UTC));
    }

    #[test]
    fn repeated_unit_is_rejected() {
        assert!(parse("1h2h").is_err());
    }

    #[test]
    fn unknown_unit_is_rejected() {
        assert!(parse("5x").is_err());
    }

    #[test]
    fn empty_spec_is_rejected() {
        assert!(parse("").is_err());
    }
}
