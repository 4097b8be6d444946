// ## 📂 File: `src/source/coerce.rs`

//! source/coerce.rs
//! Cell -> XML text, and declared-type conversion for schema profiles.
//!
//! Summary:
//! - `coerce` is total and deterministic; the same cell always yields the same text.
//! - `coerce_to` converts a cell into the representation of a declared column type
//!   or reports the mismatch. `Missing` passes through; nullability is the
//!   caller's decision.

use chrono::{NaiveDate, NaiveDateTime};

use super::types::{CellValue, ColumnType};

/// ISO-8601 without zone; fractional seconds only when non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Text form of a float: shortest round-trip decimal, never an exponent.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        String::new()
    } else if f.is_infinite() {
        if f > 0.0 { "INF".to_string() } else { "-INF".to_string() }
    } else if f == 0.0 {
        // covers -0.0
        "0".to_string()
    } else {
        format!("{}", f)
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Deterministic text rendering of a cell.
pub fn coerce(cell: &CellValue) -> String {
    match cell {
        CellValue::Missing => String::new(),
        CellValue::Integer(i) => i.to_string(),
        CellValue::Float(f) => format_float(*f),
        CellValue::Text(s) => s.clone(),
        CellValue::Timestamp(ts) => format_timestamp(ts),
    }
}

/// Cell could not be represented as the declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionMismatch {
    pub expected: ColumnType,
    pub found: String,
}

/// Parse `YYYY-MM-DD[( |T)HH:MM:SS[.f]]`.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Integral and inside i64 range.
fn float_as_integer(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if f.is_finite() && f.fract() == 0.0 && f >= -LIMIT && f < LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

/// Convert `cell` into the canonical representation of `kind`.
///
/// Booleans have no variant of their own and normalize to `Text("true"|"false")`.
pub fn coerce_to(cell: &CellValue, kind: ColumnType) -> Result<CellValue, CoercionMismatch> {
    let mismatch = || CoercionMismatch { expected: kind, found: coerce(cell) };

    if cell.is_missing() {
        return Ok(CellValue::Missing);
    }

    match kind {
        ColumnType::Text => Ok(CellValue::Text(coerce(cell))),

        ColumnType::Integer => match cell {
            CellValue::Integer(i) => Ok(CellValue::Integer(*i)),
            CellValue::Float(f) => float_as_integer(*f).map(CellValue::Integer).ok_or_else(mismatch),
            CellValue::Text(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().and_then(float_as_integer))
                    .map(CellValue::Integer)
                    .ok_or_else(mismatch)
            }
            CellValue::Timestamp(_) | CellValue::Missing => Err(mismatch()),
        },

        ColumnType::Float => match cell {
            CellValue::Integer(i) => Ok(CellValue::Float(*i as f64)),
            CellValue::Float(f) => Ok(CellValue::Float(*f)),
            CellValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| !f.is_nan())
                .map(CellValue::Float)
                .ok_or_else(mismatch),
            CellValue::Timestamp(_) | CellValue::Missing => Err(mismatch()),
        },

        ColumnType::Timestamp => match cell {
            CellValue::Timestamp(ts) => Ok(CellValue::Timestamp(*ts)),
            CellValue::Text(s) => parse_timestamp(s).map(CellValue::Timestamp).ok_or_else(mismatch),
            _ => Err(mismatch()),
        },

        ColumnType::Boolean => {
            let b = match cell {
                CellValue::Integer(0) => Some(false),
                CellValue::Integer(1) => Some(true),
                CellValue::Float(f) if *f == 0.0 => Some(false),
                CellValue::Float(f) if *f == 1.0 => Some(true),
                CellValue::Text(s) => parse_bool(s),
                _ => None,
            };
            b.map(|b| CellValue::Text(b.to_string())).ok_or_else(mismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(hh, mm, ss))
            .unwrap()
    }

    #[test]
    fn integral_floats_drop_fraction() {
        assert_eq!(coerce(&CellValue::Float(30.0)), "30");
        assert_eq!(coerce(&CellValue::Float(2.5)), "2.5");
        assert_eq!(coerce(&CellValue::Float(-0.0)), "0");
        assert_eq!(coerce(&CellValue::Float(1e21)), "1000000000000000000000");
    }

    #[test]
    fn non_finite_floats() {
        assert_eq!(coerce(&CellValue::Float(f64::INFINITY)), "INF");
        assert_eq!(coerce(&CellValue::Float(f64::NEG_INFINITY)), "-INF");
        assert_eq!(coerce(&CellValue::Float(f64::NAN)), "");
    }

    #[test]
    fn timestamps_render_iso() {
        assert_eq!(coerce(&CellValue::Timestamp(ts(2024, 3, 1, 9, 5, 0))), "2024-03-01T09:05:00");
    }

    #[test]
    fn text_parses_into_declared_numeric_types() {
        assert_eq!(coerce_to(&"42".into(), ColumnType::Integer), Ok(CellValue::Integer(42)));
        assert_eq!(coerce_to(&CellValue::Float(7.0), ColumnType::Integer), Ok(CellValue::Integer(7)));
        assert_eq!(coerce_to(&CellValue::Integer(3), ColumnType::Float), Ok(CellValue::Float(3.0)));
    }

    #[test]
    fn mismatch_reports_rendered_value() {
        let err = coerce_to(&CellValue::Float(7.5), ColumnType::Integer).unwrap_err();
        assert_eq!(err.expected, ColumnType::Integer);
        assert_eq!(err.found, "7.5");
        assert!(coerce_to(&"abc".into(), ColumnType::Float).is_err());
    }

    #[test]
    fn booleans_normalize_to_text() {
        assert_eq!(coerce_to(&"Yes".into(), ColumnType::Boolean), Ok("true".into()));
        assert_eq!(coerce_to(&CellValue::Integer(0), ColumnType::Boolean), Ok("false".into()));
        assert!(coerce_to(&CellValue::Integer(2), ColumnType::Boolean).is_err());
    }

    #[test]
    fn missing_passes_through_every_type() {
        for kind in [ColumnType::Text, ColumnType::Integer, ColumnType::Timestamp] {
            assert_eq!(coerce_to(&CellValue::Missing, kind), Ok(CellValue::Missing));
        }
    }

    #[test]
    fn date_only_text_is_midnight() {
        assert_eq!(parse_timestamp("2024-01-31"), Some(ts(2024, 1, 31, 0, 0, 0)));
        assert_eq!(parse_timestamp("2024-01-31 13:45:10"), Some(ts(2024, 1, 31, 13, 45, 10)));
        assert_eq!(parse_timestamp("31/01/2024"), None);
    }
}
