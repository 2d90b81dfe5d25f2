//! PostgreSQL `interval` values.
//!
//! PostgreSQL reports intervals in its own text format
//! (`1 year 2 mons 3 days 04:05:06.5`) while durations travel through the
//! rest of the system as ISO-8601 (`P1Y2M3DT4H5M6.5S`). [`Interval`] parses
//! both and renders either.

use std::fmt;
use std::str::FromStr;

use crate::error::{DialectError, Result};

/// A calendar interval, split into the components PostgreSQL keeps apart.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Interval {
    /// Years.
    pub years: i32,
    /// Months.
    pub months: i32,
    /// Days.
    pub days: i32,
    /// Hours.
    pub hours: i32,
    /// Minutes.
    pub minutes: i32,
    /// Seconds, possibly fractional.
    pub seconds: f64,
}

impl Interval {
    /// Returns true if every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn has_time(&self) -> bool {
        self.hours != 0 || self.minutes != 0 || self.seconds != 0.0
    }

    /// Parses PostgreSQL's default interval output.
    pub fn parse_postgres(input: &str) -> Result<Self> {
        let invalid = || DialectError::InvalidInterval(input.to_string());
        let mut interval = Self::default();
        let mut tokens = input.split_whitespace().peekable();
        if tokens.peek().is_none() {
            return Err(invalid());
        }
        while let Some(token) = tokens.next() {
            if token.contains(':') {
                interval.apply_clock(token).ok_or_else(invalid)?;
                continue;
            }
            let amount: f64 = token.parse().map_err(|_| invalid())?;
            let unit = tokens.next().ok_or_else(invalid)?;
            match unit.trim_end_matches('s') {
                "year" => interval.years = add(interval.years, amount).ok_or_else(invalid)?,
                "mon" | "month" => {
                    interval.months = add(interval.months, amount).ok_or_else(invalid)?;
                }
                "day" => interval.days = add(interval.days, amount).ok_or_else(invalid)?,
                "hour" => interval.hours = add(interval.hours, amount).ok_or_else(invalid)?,
                "min" | "minute" => {
                    interval.minutes = add(interval.minutes, amount).ok_or_else(invalid)?;
                }
                "sec" | "second" if amount.is_finite() => interval.seconds += amount,
                _ => return Err(invalid()),
            }
        }
        Ok(interval)
    }

    /// Applies a `[+-]HH:MM[:SS[.fff]]` clock token.
    fn apply_clock(&mut self, token: &str) -> Option<()> {
        let (sign, clock): (i32, &str) = match token.as_bytes().first().copied()? {
            b'-' => (-1, &token[1..]),
            b'+' => (1, &token[1..]),
            _ => (1, token),
        };
        let mut parts = clock.split(':');
        let hours: i32 = parts.next()?.parse().ok()?;
        let minutes: i32 = parts.next()?.parse().ok()?;
        let seconds: f64 = match parts.next() {
            Some(s) => s.parse().ok()?,
            None => 0.0,
        };
        if parts.next().is_some() {
            return None;
        }
        self.hours = self.hours.checked_add(sign.checked_mul(hours)?)?;
        self.minutes = self.minutes.checked_add(sign.checked_mul(minutes)?)?;
        self.seconds += f64::from(sign) * seconds;
        Some(())
    }

    /// Parses an ISO-8601 duration such as `P1Y2M3DT4H5M6.5S`.
    pub fn parse_iso(input: &str) -> Result<Self> {
        let invalid = || DialectError::InvalidInterval(input.to_string());
        let (sign, rest) = match input.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, input),
        };
        let rest = rest.strip_prefix('P').ok_or_else(invalid)?;
        if rest.is_empty() {
            return Err(invalid());
        }

        let mut interval = Self::default();
        let mut in_time = false;
        let mut number = String::new();
        for c in rest.chars() {
            match c {
                'T' if !in_time && number.is_empty() => in_time = true,
                '0'..='9' | '.' | '-' | ',' => number.push(if c == ',' { '.' } else { c }),
                unit => {
                    let amount: f64 = number.parse().map_err(|_| invalid())?;
                    number.clear();
                    match (in_time, unit) {
                        (false, 'Y') => interval.years = whole(amount).ok_or_else(invalid)?,
                        (false, 'M') => interval.months = whole(amount).ok_or_else(invalid)?,
                        (false, 'W') => {
                            interval.days =
                                add(interval.days, amount * 7.0).ok_or_else(invalid)?;
                        }
                        (false, 'D') => {
                            interval.days = add(interval.days, amount).ok_or_else(invalid)?;
                        }
                        (true, 'H') => interval.hours = whole(amount).ok_or_else(invalid)?,
                        (true, 'M') => interval.minutes = whole(amount).ok_or_else(invalid)?,
                        (true, 'S') if amount.is_finite() => interval.seconds = amount,
                        _ => return Err(invalid()),
                    }
                }
            }
        }
        if !number.is_empty() {
            return Err(invalid());
        }
        if sign < 0 {
            interval = interval.negated().ok_or_else(invalid)?;
        }
        Ok(interval)
    }

    fn negated(self) -> Option<Self> {
        Some(Self {
            years: self.years.checked_neg()?,
            months: self.months.checked_neg()?,
            days: self.days.checked_neg()?,
            hours: self.hours.checked_neg()?,
            minutes: self.minutes.checked_neg()?,
            seconds: -self.seconds,
        })
    }

    /// Renders the ISO-8601 form.
    #[must_use]
    pub fn to_iso(&self) -> String {
        if self.is_zero() {
            return String::from("PT0S");
        }
        let mut out = String::from("P");
        for (value, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if value != 0 {
                out.push_str(&format!("{value}{unit}"));
            }
        }
        if self.has_time() {
            out.push('T');
            for (value, unit) in [(self.hours, 'H'), (self.minutes, 'M')] {
                if value != 0 {
                    out.push_str(&format!("{value}{unit}"));
                }
            }
            if self.seconds != 0.0 {
                out.push_str(&format!("{}S", self.seconds));
            }
        }
        out
    }

    /// Renders PostgreSQL's default output form.
    #[must_use]
    pub fn to_postgres(&self) -> String {
        let mut parts = Vec::new();
        for (value, singular, plural) in [
            (self.years, "year", "years"),
            (self.months, "mon", "mons"),
            (self.days, "day", "days"),
        ] {
            if value != 0 {
                let unit = if value.unsigned_abs() == 1 { singular } else { plural };
                parts.push(format!("{value} {unit}"));
            }
        }
        if self.has_time() || parts.is_empty() {
            let negative = self.hours < 0 || self.minutes < 0 || self.seconds < 0.0;
            let sign = if negative { "-" } else { "" };
            let seconds = self.seconds.abs();
            let seconds = if seconds.fract() == 0.0 {
                format!("{seconds:02}")
            } else {
                let text = format!("{seconds:09.6}");
                text.trim_end_matches('0').to_string()
            };
            parts.push(format!(
                "{sign}{:02}:{:02}:{seconds}",
                self.hours.unsigned_abs(),
                self.minutes.unsigned_abs()
            ));
        }
        parts.join(" ")
    }

    /// Renders a typed SQL literal.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        format!("interval '{}'", self.to_iso())
    }
}

/// Converts an amount to a whole component, rejecting fractions.
#[allow(clippy::cast_possible_truncation)]
fn whole(amount: f64) -> Option<i32> {
    if amount.fract() != 0.0 || amount.abs() > f64::from(i32::MAX) {
        return None;
    }
    Some(amount as i32)
}

/// Adds a whole amount to a component, rejecting overflow.
fn add(total: i32, amount: f64) -> Option<i32> {
    total.checked_add(whole(amount)?)
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl FromStr for Interval {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with('P') || trimmed.starts_with("-P") {
            Self::parse_iso(trimmed)
        } else {
            Self::parse_postgres(trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_postgres_full() {
        let interval = Interval::parse_postgres("1 year 2 mons 3 days 04:05:06.5").unwrap();
        assert_eq!(
            interval,
            Interval {
                years: 1,
                months: 2,
                days: 3,
                hours: 4,
                minutes: 5,
                seconds: 6.5,
            }
        );
    }

    #[test]
    fn test_parse_postgres_negative_clock() {
        let interval = Interval::parse_postgres("-1 days -02:30:00").unwrap();
        assert_eq!(interval.days, -1);
        assert_eq!(interval.hours, -2);
        assert_eq!(interval.minutes, -30);
    }

    #[test]
    fn test_parse_postgres_rejects_garbage() {
        assert!(Interval::parse_postgres("").is_err());
        assert!(Interval::parse_postgres("3 fortnights").is_err());
        assert!(Interval::parse_postgres("1.5 days").is_err());
        assert!(Interval::parse_postgres("12").is_err());
    }

    #[test]
    fn test_parse_postgres_overflow_is_error() {
        assert!(matches!(
            Interval::parse_postgres("2147483647 days 1 day"),
            Err(DialectError::InvalidInterval(_))
        ));
        assert!(Interval::parse_postgres("2147483647 hours 01:00:00").is_err());
        assert!(Interval::parse_postgres("-2147483647 mons -1 mon 1 year").is_ok());
        assert!(Interval::parse_postgres("inf secs").is_err());
    }

    #[test]
    fn test_parse_iso_overflow_is_error() {
        assert!(Interval::parse_iso("P2147483647D1D").is_err());
        assert!(Interval::parse_iso("P306783379W").is_err());
        assert!(Interval::parse_iso("-P-2147483647D-1D").is_err());
    }

    #[test]
    fn test_parse_iso() {
        let interval = Interval::parse_iso("P1Y2M3DT4H5M6.5S").unwrap();
        assert_eq!(interval.to_postgres(), "1 year 2 mons 3 days 04:05:06.5");
        let interval = Interval::parse_iso("PT90M").unwrap();
        assert_eq!(interval.minutes, 90);
        let interval = Interval::parse_iso("P2W").unwrap();
        assert_eq!(interval.days, 14);
        let interval = Interval::parse_iso("-P1D").unwrap();
        assert_eq!(interval.days, -1);
    }

    #[test]
    fn test_parse_iso_rejects_garbage() {
        assert!(Interval::parse_iso("P").is_err());
        assert!(Interval::parse_iso("1D").is_err());
        assert!(Interval::parse_iso("P1H").is_err());
        assert!(Interval::parse_iso("P1").is_err());
    }

    #[test]
    fn test_to_iso() {
        assert_eq!(Interval::default().to_iso(), "PT0S");
        let interval = Interval {
            days: 3,
            hours: 1,
            ..Interval::default()
        };
        assert_eq!(interval.to_iso(), "P3DT1H");
        assert_eq!(interval.to_sql_literal(), "interval 'P3DT1H'");
    }

    #[test]
    fn test_to_postgres() {
        assert_eq!(Interval::default().to_postgres(), "00:00:00");
        let interval = Interval {
            days: 1,
            ..Interval::default()
        };
        assert_eq!(interval.to_postgres(), "1 day");
        let interval = Interval {
            minutes: -5,
            ..Interval::default()
        };
        assert_eq!(interval.to_postgres(), "-00:05:00");
    }

    #[test]
    fn test_from_str_dispatch() {
        let iso: Interval = "P1D".parse().unwrap();
        let pg: Interval = "1 day".parse().unwrap();
        assert_eq!(iso, pg);
    }
}
