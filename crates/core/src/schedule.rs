// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron expression parsing shared between Task validation and the Scheduler.
//!
//! Accepts standard 5-field cron (`min hour dom month dow`), the `cron` crate's
//! native 6/7-field form (seconds leading), and the shortcuts `@daily`, `@hourly`,
//! and `@every <duration>` (duration parsed as humantime-style `1h30m`, `90s`, ...).

use cron::Schedule;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum ParsedSchedule {
    Cron(Schedule),
    Every(Duration),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ScheduleParseError(pub String);

/// Parse a schedule string. `schedule` must be non-empty and non-whitespace-only;
/// callers treat an empty string as "not scheduled" before reaching here.
pub fn parse_schedule(expr: &str) -> Result<ParsedSchedule, ScheduleParseError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(ScheduleParseError("schedule must not be empty".into()));
    }

    if let Some(rest) = trimmed.strip_prefix("@every ") {
        return parse_duration(rest.trim()).map(ParsedSchedule::Every);
    }
    match trimmed {
        "@daily" => return Ok(ParsedSchedule::Cron(
            Schedule::from_str("0 0 0 * * *").expect("static expression"),
        )),
        "@hourly" => return Ok(ParsedSchedule::Cron(
            Schedule::from_str("0 0 * * * *").expect("static expression"),
        )),
        _ => {}
    }

    // Try as-is (native 6/7-field `cron` crate syntax), then fall back to
    // treating it as a standard 5-field expression by prefixing a seconds field.
    if let Ok(schedule) = Schedule::from_str(trimmed) {
        return Ok(ParsedSchedule::Cron(schedule));
    }
    let with_seconds = format!("0 {trimmed}");
    Schedule::from_str(&with_seconds)
        .map(ParsedSchedule::Cron)
        .map_err(|e| ScheduleParseError(format!("invalid cron expression {trimmed:?}: {e}")))
}

/// Parse a simple `<n><unit>` duration, units: `s`, `m`, `h`, `d`. Multiple
/// components (e.g. `1h30m`) are summed.
pub fn parse_duration(s: &str) -> Result<Duration, ScheduleParseError> {
    let mut total = Duration::ZERO;
    let mut num = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            num.push(c);
            continue;
        }
        let n: u64 = num
            .parse()
            .map_err(|_| ScheduleParseError(format!("invalid duration {s:?}")))?;
        num.clear();
        let unit = match c {
            's' => Duration::from_secs(n),
            'm' => Duration::from_secs(n * 60),
            'h' => Duration::from_secs(n * 3600),
            'd' => Duration::from_secs(n * 86_400),
            other => return Err(ScheduleParseError(format!("unknown duration unit {other:?}"))),
        };
        total += unit;
    }
    if !num.is_empty() || total.is_zero() {
        return Err(ScheduleParseError(format!("invalid duration {s:?}")));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(parse_schedule("").is_err());
        assert!(parse_schedule("   ").is_err());
    }

    #[test]
    fn accepts_five_field_cron() {
        assert!(matches!(
            parse_schedule("*/5 * * * *"),
            Ok(ParsedSchedule::Cron(_))
        ));
    }

    #[test]
    fn accepts_daily_and_hourly_shortcuts() {
        assert!(matches!(parse_schedule("@daily"), Ok(ParsedSchedule::Cron(_))));
        assert!(matches!(parse_schedule("@hourly"), Ok(ParsedSchedule::Cron(_))));
    }

    #[test]
    fn accepts_every_shortcut() {
        match parse_schedule("@every 1s").unwrap() {
            ParsedSchedule::Every(d) => assert_eq!(d, Duration::from_secs(1)),
            _ => panic!("expected Every"),
        }
        match parse_schedule("@every 1h30m").unwrap() {
            ParsedSchedule::Every(d) => assert_eq!(d, Duration::from_secs(5400)),
            _ => panic!("expected Every"),
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_schedule("not a cron expression").is_err());
    }

    #[test]
    fn rejects_unrecognized_tokens() {
        assert!(parse_schedule("@every").is_err());
        assert!(parse_schedule("@every nope").is_err());
    }
}
