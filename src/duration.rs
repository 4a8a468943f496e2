// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Duration parsing for Go-style duration strings.
//!
//! The `timeouts` attributes take Go durations (`"300ms"`, `"45s"`, `"10m"`,
//! `"1h30m"`), parsed here into `std::time::Duration`.

use anyhow::{bail, Context, Result};
use std::time::Duration;

const NANOS_PER_MICRO: f64 = 1e3;
const NANOS_PER_MILLI: f64 = 1e6;
const NANOS_PER_SECOND: f64 = 1e9;
const NANOS_PER_MINUTE: f64 = 60.0 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: f64 = 60.0 * NANOS_PER_MINUTE;

/// Parse a Go-style duration string into a Rust `Duration`.
///
/// A duration is a sequence of decimal numbers, each with an optional fraction
/// and a unit suffix. Supported units:
/// - `ns`, `us` (or `µs`), `ms`
/// - `s`, `m`, `h`
///
/// `"0"` is accepted without a unit.
///
/// # Examples
///
/// ```
/// use hive_provider::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
///
/// assert!(parse_duration("").is_err());
/// assert!(parse_duration("10").is_err());  // Missing unit
/// assert!(parse_duration("10x").is_err()); // Invalid unit
/// assert!(parse_duration("-5m").is_err()); // Negative
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, negative, has a missing or unknown
/// unit, or a malformed number.
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    if duration_str.is_empty() {
        bail!("Duration string cannot be empty");
    }
    if duration_str.starts_with('-') {
        bail!("Duration '{duration_str}' must not be negative");
    }
    let input = duration_str.strip_prefix('+').unwrap_or(duration_str);
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = input;
    let mut total_nanos = 0f64;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .with_context(|| format!("Duration '{duration_str}' is missing a unit (ns, us, ms, s, m, h)"))?;
        let (number, tail) = rest.split_at(number_end);
        if number.is_empty() || number == "." {
            bail!("Invalid duration '{duration_str}'");
        }
        let value: f64 = number
            .parse()
            .with_context(|| format!("Invalid number '{number}' in duration '{duration_str}'"))?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);

        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SECOND,
            "m" => NANOS_PER_MINUTE,
            "h" => NANOS_PER_HOUR,
            _ => bail!(
                "Unsupported duration unit '{unit}' in '{duration_str}'. Use ns, us, ms, s, m or h"
            ),
        };

        total_nanos += value * scale;
        rest = next;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        bail!("Duration '{duration_str}' is too large");
    }

    // Truncation to whole nanoseconds matches Go's parser
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Duration::from_nanos(total_nanos as u64))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
