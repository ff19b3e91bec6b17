// src/delay.rs
// =============================================================================
// Parses the -t flag into a Duration.
//
// Accepted format: one or more <number><unit> pairs with no spaces, e.g.
// "10m", "1h30m", "1.5s", "250ms". Units: ns, us (or µs), ms, s, m, h.
// A bare "0" is also accepted.
//
// Unlike Go's time.ParseDuration, which the original -t flag went through,
// no leading sign is accepted: "-1s" and "+1s" are errors here, while Go
// takes them (a negative delay there simply means no sleep).
// =============================================================================

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DelayError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration '{0}'")]
    Invalid(String),
    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),
    #[error("unknown unit '{unit}' in duration '{input}'")]
    UnknownUnit { unit: String, input: String },
}

// Nanoseconds per unit
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

pub fn parse_delay(input: &str) -> Result<Duration, DelayError> {
    if input.is_empty() {
        return Err(DelayError::Empty);
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let invalid = || DelayError::Invalid(input.to_string());

    let mut rest = input;
    let mut total_nanos = 0f64;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(invalid());
        }
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DelayError::MissingUnit(input.to_string()));
        }

        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| DelayError::UnknownUnit {
                unit: unit.to_string(),
                input: input.to_string(),
            })?;

        total_nanos += value * scale;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid());
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_units() {
        assert_eq!(parse_delay("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_delay("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_delay("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_delay("15us").unwrap(), Duration::from_micros(15));
    }

    #[test]
    fn test_compound_and_fractional() {
        assert_eq!(parse_delay("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_delay("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_delay("1m0.5s").unwrap(), Duration::from_millis(60_500));
    }

    #[test]
    fn test_zero() {
        assert_eq!(parse_delay("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_delay("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(parse_delay(""), Err(DelayError::Empty));
        assert_eq!(parse_delay("10"), Err(DelayError::MissingUnit("10".to_string())));
        assert!(matches!(parse_delay("5d"), Err(DelayError::UnknownUnit { .. })));
        assert!(matches!(parse_delay("-1s"), Err(DelayError::Invalid(_))));
        assert!(matches!(parse_delay("+1s"), Err(DelayError::Invalid(_))));
        assert!(matches!(parse_delay("abc"), Err(DelayError::Invalid(_))));
        assert!(matches!(parse_delay("1..2s"), Err(DelayError::Invalid(_))));
    }
}
