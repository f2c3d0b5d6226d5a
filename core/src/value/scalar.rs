//! Text conversions for the built-in flag types.

use std::num::IntErrorKind;
use std::time::Duration;

use crate::error::ValueError;

use super::duration::{format_duration, parse_duration};

/// A plain type that can live in a [`Handle`](super::Handle) and act as a
/// flag value.
pub trait Scalar: Clone + 'static {
    /// Name shown for the type in usage text.
    const TYPE_HINT: &'static str;
    /// Whether a bare occurrence toggles the value.
    const IS_BOOL: bool = false;

    fn parse_text(raw: &str) -> Result<Self, ValueError>;

    fn format_text(&self) -> String;
}

impl Scalar for bool {
    const TYPE_HINT: &'static str = "";
    const IS_BOOL: bool = true;

    fn parse_text(raw: &str) -> Result<Self, ValueError> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(ValueError::Syntax),
        }
    }

    fn format_text(&self) -> String {
        self.to_string()
    }
}

macro_rules! integer_scalar {
    ($($ty:ty => $hint:literal, $signed:literal;)*) => {
        $(
            impl Scalar for $ty {
                const TYPE_HINT: &'static str = $hint;

                fn parse_text(raw: &str) -> Result<Self, ValueError> {
                    let value = parse_integer(raw, $signed)?;
                    <$ty>::try_from(value).map_err(|_| ValueError::Range)
                }

                fn format_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_scalar! {
    isize => "int", true;
    i64 => "int", true;
    usize => "uint", false;
    u64 => "uint", false;
}

impl Scalar for f64 {
    const TYPE_HINT: &'static str = "float";

    fn parse_text(raw: &str) -> Result<Self, ValueError> {
        let value: f64 = raw.parse().map_err(|_| ValueError::Syntax)?;
        if value.is_infinite() && !is_infinity_literal(raw) {
            return Err(ValueError::Range);
        }
        Ok(value)
    }

    fn format_text(&self) -> String {
        self.to_string()
    }
}

impl Scalar for String {
    const TYPE_HINT: &'static str = "string";

    fn parse_text(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }

    fn format_text(&self) -> String {
        self.clone()
    }
}

impl Scalar for Duration {
    const TYPE_HINT: &'static str = "duration";

    fn parse_text(raw: &str) -> Result<Self, ValueError> {
        parse_duration(raw)
    }

    fn format_text(&self) -> String {
        format_duration(*self)
    }
}

/// Parses an integer literal with an optional base prefix.
///
/// Accepts `0x`, `0o`, `0b` prefixes (either case), a bare leading `0` for
/// octal, and `_` between digits. Signs are accepted only when `signed`.
fn parse_integer(raw: &str, signed: bool) -> Result<i128, ValueError> {
    let (negative, body) = match raw.as_bytes().first() {
        Some(b'-') if signed => (true, &raw[1..]),
        Some(b'+') if signed => (false, &raw[1..]),
        _ => (false, raw),
    };

    let (radix, digits, prefixed) = split_radix(body);
    let digits = strip_separators(digits, prefixed)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ValueError::Syntax);
    }

    let magnitude = u128::from_str_radix(&digits, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => ValueError::Range,
        _ => ValueError::Syntax,
    })?;
    let magnitude = i128::try_from(magnitude).map_err(|_| ValueError::Range)?;

    Ok(if negative { -magnitude } else { magnitude })
}

fn split_radix(body: &str) -> (u32, &str, bool) {
    let bytes = body.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        return match bytes[1] {
            b'x' | b'X' => (16, &body[2..], true),
            b'o' | b'O' => (8, &body[2..], true),
            b'b' | b'B' => (2, &body[2..], true),
            _ => (8, &body[1..], true),
        };
    }
    (10, body, false)
}

fn strip_separators(digits: &str, prefixed: bool) -> Result<String, ValueError> {
    if !digits.contains('_') {
        return Ok(digits.to_string());
    }
    if digits.ends_with('_') || digits.contains("__") || (digits.starts_with('_') && !prefixed) {
        return Err(ValueError::Syntax);
    }
    Ok(digits.replace('_', ""))
}

fn is_infinity_literal(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}
