//! Unit-suffixed duration literals such as `1h30m`, `1.5s`, or `300ms`.

use std::time::Duration;

use crate::error::ValueError;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

// Fraction digits beyond this cannot change a nanosecond count.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parses a duration literal.
///
/// The literal is an optional `+` followed by one or more
/// `<digits>[.<digits>]<unit>` segments, with units `ns`, `us`, `µs`, `μs`,
/// `ms`, `s`, `m`, `h`. The bare literal `0` is also accepted. Negative
/// durations cannot be represented and report [`ValueError::Range`].
///
/// ```
/// use std::time::Duration;
/// use flagset_core::parse_duration;
///
/// assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
/// assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
/// assert!(parse_duration("10").is_err());
/// ```
pub fn parse_duration(raw: &str) -> Result<Duration, ValueError> {
    let mut rest = raw.strip_prefix('+').unwrap_or(raw);
    if rest.starts_with('-') {
        return Err(ValueError::Range);
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(ValueError::Syntax);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let whole_len = leading_digits(rest);
        let (whole, after) = rest.split_at(whole_len);
        rest = after;

        let mut fraction = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let len = leading_digits(after_dot);
            fraction = &after_dot[..len];
            rest = &after_dot[len..];
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(ValueError::Syntax);
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (unit, after) = rest.split_at(unit_len);
        rest = after;
        let scale = unit_scale(unit)?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| ValueError::Range)?
        };
        let mut nanos = whole.checked_mul(scale).ok_or(ValueError::Range)?;
        nanos = nanos
            .checked_add(fraction_nanos(fraction, scale))
            .ok_or(ValueError::Range)?;
        total = total.checked_add(nanos).ok_or(ValueError::Range)?;
    }

    let secs = u64::try_from(total / NANOS_PER_SECOND).map_err(|_| ValueError::Range)?;
    // The remainder is below one billion and always fits.
    let subsec = (total % NANOS_PER_SECOND) as u32;
    Ok(Duration::new(secs, subsec))
}

/// Renders a duration in the canonical form accepted by [`parse_duration`].
///
/// ```
/// use std::time::Duration;
/// use flagset_core::format_duration;
///
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// assert_eq!(format_duration(Duration::from_secs(120)), "2m0s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
/// assert_eq!(format_duration(Duration::from_micros(300)), "300µs");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_nanos();
    if total == 0 {
        return "0s".to_string();
    }

    if total < NANOS_PER_SECOND {
        let (scale, unit) = if total < NANOS_PER_MICRO {
            (1, "ns")
        } else if total < NANOS_PER_MILLI {
            (NANOS_PER_MICRO, "µs")
        } else {
            (NANOS_PER_MILLI, "ms")
        };
        return format!("{}{unit}", decimal(total, scale));
    }

    let hours = total / NANOS_PER_HOUR;
    let minutes = (total % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
    let seconds = total % NANOS_PER_MINUTE;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&decimal(seconds, NANOS_PER_SECOND));
    out.push('s');
    out
}

fn leading_digits(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

fn unit_scale(unit: &str) -> Result<u128, ValueError> {
    match unit {
        "ns" => Ok(1),
        "us" | "µs" | "μs" => Ok(NANOS_PER_MICRO),
        "ms" => Ok(NANOS_PER_MILLI),
        "s" => Ok(NANOS_PER_SECOND),
        "m" => Ok(NANOS_PER_MINUTE),
        "h" => Ok(NANOS_PER_HOUR),
        _ => Err(ValueError::Syntax),
    }
}

fn fraction_nanos(fraction: &str, scale: u128) -> u128 {
    let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for digit in digits.bytes() {
        numerator = numerator * 10 + u128::from(digit - b'0');
        denominator *= 10;
    }
    numerator * scale / denominator
}

/// `value / scale` as a decimal with trailing fraction zeros trimmed.
fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let remainder = value % scale;
    if remainder == 0 {
        return whole.to_string();
    }
    let width = scale.ilog10() as usize;
    let fraction = format!("{remainder:0width$}");
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}
