//! Parsing of user-entered production rates

use regex::Regex;

use crate::error::RateError;

/// Parse `90/min`, `1.5/s`, `3600/h` or a bare number (per second) into items/s
pub fn parse_rate(input: &str) -> Result<f64, RateError> {
    // Number, then an optional "/unit"
    let rate_re = Regex::new(r"^\s*(\d+(?:\.\d*)?|\.\d+)\s*(?:/\s*([A-Za-z]+))?\s*$")
        .map_err(|e| RateError::Pattern(e.to_string()))?;
    let captures = rate_re
        .captures(input)
        .ok_or_else(|| RateError::Malformed(input.to_string()))?;

    let value: f64 = captures[1]
        .parse()
        .map_err(|_| RateError::Malformed(input.to_string()))?;

    let seconds_per_unit = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        None => 1.0,
        Some(unit) => match unit.as_str() {
            "s" | "sec" | "second" => 1.0,
            "m" | "min" | "minute" => 60.0,
            "h" | "hr" | "hour" => 3600.0,
            _ => return Err(RateError::UnknownUnit(unit)),
        },
    };

    Ok(value / seconds_per_unit)
}
