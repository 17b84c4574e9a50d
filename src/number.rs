//! Integer and float codecs for the schema layer.
//!
//! All integer parsers accept an optional sign, the base prefix of their
//! radix (optional), and `_` digit separators. Arithmetic is checked; values
//! that do not fit are reported as [`SchemaError::Overflow`].

use crate::{SchemaError, FLOAT_TAG, INT_TAG};

fn invalid(tag: &str, text: &str) -> SchemaError {
    SchemaError::InvalidValue {
        tag: String::from(tag),
        value: String::from(text),
    }
}

fn overflow(text: &str) -> SchemaError {
    SchemaError::Overflow {
        value: String::from(text),
    }
}

/// Split a leading sign off; returns whether the number is negative.
fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    }
}

fn strip_radix_prefix<'a>(digits: &'a str, marker: char) -> &'a str {
    let mut chars = digits.chars();
    if chars.next() == Some('0') && chars.next().map(|ch| ch.to_ascii_lowercase()) == Some(marker)
    {
        &digits[2..]
    } else {
        digits
    }
}

fn magnitude(text: &str, digits: &str, radix: u32) -> Result<u64, SchemaError> {
    let mut value: u64 = 0;
    let mut seen_digit = false;
    for ch in digits.chars() {
        if ch == '_' {
            continue;
        }
        let digit = ch.to_digit(radix).ok_or_else(|| invalid(INT_TAG, text))?;
        value = value
            .checked_mul(u64::from(radix))
            .and_then(|value| value.checked_add(u64::from(digit)))
            .ok_or_else(|| overflow(text))?;
        seen_digit = true;
    }
    if seen_digit {
        Ok(value)
    } else {
        Err(invalid(INT_TAG, text))
    }
}

fn apply_sign(text: &str, negative: bool, magnitude: u64) -> Result<i64, SchemaError> {
    if negative {
        // The magnitude of i64::MIN is one more than i64::MAX.
        if magnitude <= i64::MAX as u64 + 1 {
            Ok((magnitude as i64).wrapping_neg())
        } else {
            Err(overflow(text))
        }
    } else {
        i64::try_from(magnitude).map_err(|_| overflow(text))
    }
}

fn parse_signed(text: &str, radix: u32, marker: Option<char>) -> Result<i64, SchemaError> {
    let (negative, rest) = split_sign(text);
    let digits = match marker {
        Some(marker) => strip_radix_prefix(rest, marker),
        None => rest,
    };
    apply_sign(text, negative, magnitude(text, digits, radix)?)
}

fn parse_unsigned(text: &str, radix: u32, marker: Option<char>) -> Result<u64, SchemaError> {
    let (negative, rest) = split_sign(text);
    if negative {
        return Err(invalid(INT_TAG, text));
    }
    let digits = match marker {
        Some(marker) => strip_radix_prefix(rest, marker),
        None => rest,
    };
    magnitude(text, digits, radix)
}

pub fn parse_base2(text: &str) -> Result<i64, SchemaError> {
    parse_signed(text, 2, Some('b'))
}

/// Octal, with either the `0o` prefix or a plain leading zero.
pub fn parse_base8(text: &str) -> Result<i64, SchemaError> {
    parse_signed(text, 8, Some('o'))
}

pub fn parse_base10(text: &str) -> Result<i64, SchemaError> {
    parse_signed(text, 10, None)
}

pub fn parse_base16(text: &str) -> Result<i64, SchemaError> {
    parse_signed(text, 16, Some('x'))
}

/// Sexagesimal integers such as `190:20:30`.
pub fn parse_base60(text: &str) -> Result<i64, SchemaError> {
    let (negative, rest) = split_sign(text);
    apply_sign(text, negative, sexagesimal_magnitude(text, rest)?)
}

pub fn parse_unsigned_base2(text: &str) -> Result<u64, SchemaError> {
    parse_unsigned(text, 2, Some('b'))
}

pub fn parse_unsigned_base8(text: &str) -> Result<u64, SchemaError> {
    parse_unsigned(text, 8, Some('o'))
}

pub fn parse_unsigned_base10(text: &str) -> Result<u64, SchemaError> {
    parse_unsigned(text, 10, None)
}

pub fn parse_unsigned_base16(text: &str) -> Result<u64, SchemaError> {
    parse_unsigned(text, 16, Some('x'))
}

pub fn parse_unsigned_base60(text: &str) -> Result<u64, SchemaError> {
    let (negative, rest) = split_sign(text);
    if negative {
        return Err(invalid(INT_TAG, text));
    }
    sexagesimal_magnitude(text, rest)
}

fn sexagesimal_magnitude(text: &str, digits: &str) -> Result<u64, SchemaError> {
    let mut parts = digits.split(':');
    let first = parts.next().unwrap_or_default();
    let mut value = magnitude(text, first, 10)?;
    for part in parts {
        let part = sexagesimal_part(text, part)?;
        value = value
            .checked_mul(60)
            .and_then(|value| value.checked_add(part))
            .ok_or_else(|| overflow(text))?;
    }
    Ok(value)
}

/// One `[0-5]?[0-9]` group after a colon.
fn sexagesimal_part(text: &str, part: &str) -> Result<u64, SchemaError> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(INT_TAG, text));
    }
    let value = magnitude(text, part, 10)?;
    if value < 60 {
        Ok(value)
    } else {
        Err(invalid(INT_TAG, text))
    }
}

/// Parse a float, including `_` separators, sexagesimal notation and the
/// `.inf`/`.nan` spellings.
pub fn parse_float(text: &str) -> Result<f64, SchemaError> {
    let cleaned: String = text.chars().filter(|&ch| ch != '_').collect();
    let (negative, body) = split_sign(&cleaned);
    let sign = if negative { -1.0 } else { 1.0 };

    match body {
        ".inf" | ".Inf" | ".INF" => return Ok(sign * f64::INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Ok(f64::NAN),
        _ => {}
    }

    if body.contains(':') {
        let mut parts = body.split(':').peekable();
        let mut value = 0.0;
        while let Some(part) = parts.next() {
            let is_last = parts.peek().is_none();
            let part_value = if is_last {
                parse_plain_float(text, part)?
            } else {
                magnitude(text, part, 10).map_err(|_| invalid(FLOAT_TAG, text))? as f64
            };
            value = value * 60.0 + part_value;
        }
        return Ok(sign * value);
    }

    Ok(sign * parse_plain_float(text, body)?)
}

fn parse_plain_float(text: &str, body: &str) -> Result<f64, SchemaError> {
    let well_formed = body.bytes().any(|b| b.is_ascii_digit())
        && body
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !well_formed {
        return Err(invalid(FLOAT_TAG, text));
    }
    body.parse::<f64>().map_err(|_| invalid(FLOAT_TAG, text))
}

/// Format a float so that it reads back as a float.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::from(".nan")
    } else if value.is_infinite() {
        String::from(if value > 0.0 { ".inf" } else { "-.inf" })
    } else {
        let mut string = value.to_string();
        if !string.contains(|ch: char| ch == '.' || ch == 'e' || ch == 'E') {
            string.push_str(".0");
        }
        string
    }
}
