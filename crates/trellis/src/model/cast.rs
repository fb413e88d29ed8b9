//! Conversion of raw attribute strings into typed model values.

use super::value::{PropType, Value};
use crate::error::CastError;

/// Cast a raw attribute string to a value of the given type.
///
/// Only serialized object and array values can fail. A well-formed document of
/// the wrong shape (an array for an object property, say) is returned as-is
/// and rejected by the model's type check.
pub fn cast(ty: PropType, raw: &str) -> Result<Value, CastError> {
    Ok(match ty {
        PropType::String => Value::String(raw.to_string()),
        PropType::Number => Value::Number(parse_number(raw)),
        PropType::Boolean => Value::Boolean(!raw.is_empty()),
        PropType::Object | PropType::Array => {
            let v: serde_json::Value = serde_json::from_str(raw)?;
            Value::from_json(v).ok_or(CastError::Null)?
        }
    })
}

/// Lenient numeric parse. Malformed input is `NaN`, not an error.
fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |v| v as f64);
        }
    }
    // Rust accepts spellings like "inf" and "nan" that a UI host does not.
    let decimal = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(parse_number("5"), 5.0);
        assert_eq!(parse_number(" 2.5 "), 2.5);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number("0x1f"), 31.0);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("1.2.3").is_nan());
    }

    #[test]
    fn booleans_are_truthy() {
        assert_eq!(cast(PropType::Boolean, "true").unwrap(), Value::Boolean(true));
        assert_eq!(cast(PropType::Boolean, "false").unwrap(), Value::Boolean(true));
        assert_eq!(cast(PropType::Boolean, "").unwrap(), Value::Boolean(false));
    }

    #[test]
    fn serialized() {
        assert_eq!(
            cast(PropType::Object, r#"{"a": 1}"#).unwrap().kind(),
            PropType::Object
        );
        assert_eq!(
            cast(PropType::Array, "[1, 2]").unwrap(),
            Value::Array(vec![json!(1), json!(2)])
        );
        // Shape mismatches are left to the model's type check.
        assert_eq!(cast(PropType::Object, "[]").unwrap().kind(), PropType::Array);
        assert!(matches!(
            cast(PropType::Object, "{nope"),
            Err(CastError::Json(_))
        ));
        assert!(matches!(cast(PropType::Array, "null"), Err(CastError::Null)));
    }

    #[test]
    fn strings_are_verbatim() {
        assert_eq!(cast(PropType::String, " x ").unwrap(), Value::from(" x "));
    }
}
