//! Length values as stored in the persisted document.
//!
//! Geometry is stringly-typed on disk: every length carries its own unit
//! suffix (`120px`, `12.32vw`, `40.00vh`, `10.00%`) or uses the
//! `calc(50% + Npx)` centering form. `Length` is the parsed in-memory
//! shape; serde round-trips it through the string encoding.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One stored length. Pixel values appear while a control is being
/// interactively dragged or resized; viewport units and percentages are
/// what the persistence-boundary converters write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute pixels: `"632px"`. A bare number parses as px too.
    Px(f64),
    /// Percent of the canvas width: `"12.32vw"`.
    Vw(f64),
    /// Percent of the canvas height: `"13.33vh"`.
    Vh(f64),
    /// Percent of the parent box, axis-appropriate: `"10.00%"`.
    Percent(f64),
    /// Centering form: `"calc(50% + Npx)"` — the control's midpoint sits
    /// at the container's midpoint, offset by N pixels. A zero offset
    /// serializes as the bare literal `"50%"`.
    Calc { offset_px: f64 },
}

impl Length {
    /// The raw numeric part, unit ignored.
    pub fn value(&self) -> f64 {
        match *self {
            Length::Px(v) | Length::Vw(v) | Length::Vh(v) | Length::Percent(v) => v,
            Length::Calc { offset_px } => offset_px,
        }
    }

    pub fn is_px(&self) -> bool {
        matches!(self, Length::Px(_))
    }
}

/// Shortest decimal rendering of a pixel count: `632px` not `632.00px`.
fn format_num(n: f64) -> String {
    if n == n.floor() {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Length::Px(v) => write!(f, "{}px", format_num(v)),
            // Converted units keep exactly two decimals, matching what the
            // export pass writes ("40.00vh", "10.00%").
            Length::Vw(v) => write!(f, "{v:.2}vw"),
            Length::Vh(v) => write!(f, "{v:.2}vh"),
            Length::Percent(v) => write!(f, "{v:.2}%"),
            Length::Calc { offset_px } => {
                if offset_px == 0.0 {
                    write!(f, "50%")
                } else {
                    write!(f, "calc(50% + {}px)", format_num(offset_px))
                }
            }
        }
    }
}

/// Error parsing a length string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLengthError(String);

impl fmt::Display for ParseLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid length value: {:?}", self.0)
    }
}

impl std::error::Error for ParseLengthError {}

impl FromStr for Length {
    type Err = ParseLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseLengthError(s.to_string());

        if let Some(body) = s.strip_prefix("calc(") {
            // calc(50% + Npx) — N may be negative.
            let body = body.strip_suffix(')').ok_or_else(err)?;
            let rest = body.trim().strip_prefix("50%").ok_or_else(err)?;
            let rest = rest.trim_start().strip_prefix('+').ok_or_else(err)?;
            let num = rest.trim().strip_suffix("px").ok_or_else(err)?;
            let offset_px = num.trim().parse::<f64>().map_err(|_| err())?;
            return Ok(Length::Calc { offset_px });
        }

        if let Some(num) = s.strip_suffix("px") {
            return num.trim().parse().map(Length::Px).map_err(|_| err());
        }
        if let Some(num) = s.strip_suffix("vw") {
            return num.trim().parse().map(Length::Vw).map_err(|_| err());
        }
        if let Some(num) = s.strip_suffix("vh") {
            return num.trim().parse().map(Length::Vh).map_err(|_| err());
        }
        if let Some(num) = s.strip_suffix('%') {
            return num.trim().parse().map(Length::Percent).map_err(|_| err());
        }

        // Bare numbers are pixels.
        s.parse().map(Length::Px).map_err(|_| err())
    }
}

impl Serialize for Length {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Length {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
