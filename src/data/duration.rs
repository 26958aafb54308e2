use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to milliseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ms", 1.0),
    ("s", 1_000.0),
    ("m", 60_000.0),
    ("h", 3_600_000.0),
];

const MS_PER_DAY: u64 = 86_400_000;
const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Parse interval strings like "5s", "1500ms", "2m" or a bare millisecond count.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if let Ok(ms) = s.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.parse()?;
            if val < 0.0 {
                bail!("Negative duration: {}", s);
            }
            return Ok(Duration::from_millis((val * multiplier) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Format a millisecond count as `2d 1h 0m 12s`.
///
/// Leading zero units are dropped; once a unit is shown every smaller unit
/// follows it, and seconds are always present.
pub fn format_hms(ms: u64) -> String {
    let days = ms / MS_PER_DAY;
    let rem = ms % MS_PER_DAY;
    let hours = rem / MS_PER_HOUR;
    let rem = rem % MS_PER_HOUR;
    let minutes = rem / MS_PER_MINUTE;
    let seconds = (rem % MS_PER_MINUTE) / MS_PER_SECOND;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d "));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{hours}h "));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m "));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

/// Short form used in the status bar ("5s", "1m 30s").
pub fn format_interval(d: Duration) -> String {
    let ms = d.as_millis() as u64;
    if ms < MS_PER_SECOND {
        format!("{ms}ms")
    } else {
        format_hms(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        let d = parse_duration("5s").unwrap();
        assert_eq!(d, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_milliseconds() {
        let d = parse_duration("1500ms").unwrap();
        assert_eq!(d.as_millis(), 1500);
    }

    #[test]
    fn test_parse_bare_number_is_millis() {
        let d = parse_duration("7000").unwrap();
        assert_eq!(d, Duration::from_secs(7));
    }

    #[test]
    fn test_parse_fractional_minutes() {
        let d = parse_duration("1.5m").unwrap();
        assert_eq!(d, Duration::from_secs(90));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn hms_zero_is_seconds_only() {
        assert_eq!(format_hms(0), "0s");
        assert_eq!(format_hms(999), "0s");
    }

    #[test]
    fn hms_minutes_and_seconds() {
        assert_eq!(format_hms(65_000), "1m 5s");
        assert_eq!(format_hms(303_000), "5m 3s");
    }

    #[test]
    fn hms_every_unit() {
        assert_eq!(format_hms(90_061_000), "1d 1h 1m 1s");
        assert_eq!(format_hms(2 * 86_400_000 + 3_600_000 + 12_000), "2d 1h 0m 12s");
    }

    #[test]
    fn hms_keeps_inner_zero_units() {
        assert_eq!(format_hms(3_600_000), "1h 0m 0s");
    }

    #[test]
    fn interval_formatting() {
        assert_eq!(format_interval(Duration::from_millis(250)), "250ms");
        assert_eq!(format_interval(Duration::from_secs(5)), "5s");
    }
}
