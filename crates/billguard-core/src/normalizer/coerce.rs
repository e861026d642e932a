//! Field coercion helpers over untyped JSON values.
//!
//! Each helper takes the (possibly missing) value of one field and always
//! returns something usable.

use serde_json::Value;

/// Text value; numbers and booleans are rendered, anything else is empty.
pub fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Text value, substituting `default` when missing or empty.
pub fn text_or(value: Option<&Value>, default: &str) -> String {
    let s = text(value);
    if s.is_empty() {
        default.to_string()
    } else {
        s
    }
}

/// Text value, `None` when missing or empty.
pub fn optional_text(value: Option<&Value>) -> Option<String> {
    let s = text(value);
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Best-effort numeric coercion, 0 when the value is not numeric.
///
/// Accepts JSON numbers and numeric strings such as `"150.5"`, `" 12 "`,
/// `"$1,200.00"` or `"-$40"`. Negative values are kept.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_numeric_text(s),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn parse_numeric_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let digits: String = unsigned
        .strip_prefix('$')
        .unwrap_or(unsigned)
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if digits.is_empty() {
        return None;
    }
    let n: f64 = digits.parse().ok()?;
    Some(if negative { -n } else { n })
}

/// Enum-like field: parsed when a non-empty string is supplied, `default` otherwise.
///
/// Unknown strings are passed through as the enum's unrecognized variant.
pub fn enum_or<T>(value: Option<&Value>, default: T) -> T
where
    T: for<'a> From<&'a str>,
{
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => T::from(s.as_str()),
        _ => default,
    }
}

/// Elements of an array field; empty when missing or not an array.
pub fn array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// Each element of an array field coerced to text.
pub fn text_list(value: Option<&Value>) -> Vec<String> {
    array(value).iter().map(|item| text(Some(item))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;
    use serde_json::json;

    #[test]
    fn test_text() {
        assert_eq!(text(Some(&json!("hello"))), "hello");
        assert_eq!(text(Some(&json!(42))), "42");
        assert_eq!(text(Some(&json!(null))), "");
        assert_eq!(text(Some(&json!({"a": 1}))), "");
        assert_eq!(text(None), "");
    }

    #[test]
    fn test_text_or_and_optional() {
        assert_eq!(text_or(Some(&json!("")), "USD"), "USD");
        assert_eq!(text_or(Some(&json!("EUR")), "USD"), "EUR");
        assert_eq!(optional_text(Some(&json!(""))), None);
        assert_eq!(optional_text(Some(&json!(null))), None);
        assert_eq!(optional_text(Some(&json!("Mar 1"))), Some("Mar 1".into()));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some(&json!(4850))), 4850.0);
        assert_eq!(coerce_number(Some(&json!("150.5"))), 150.5);
        assert_eq!(coerce_number(Some(&json!("abc"))), 0.0);
        assert_eq!(coerce_number(Some(&json!(" 12 "))), 12.0);
        assert_eq!(coerce_number(Some(&json!("$1,200.00"))), 1200.0);
        assert_eq!(coerce_number(Some(&json!("-$40"))), -40.0);
        assert_eq!(coerce_number(Some(&json!(-15.25))), -15.25);
        assert_eq!(coerce_number(Some(&json!(""))), 0.0);
        assert_eq!(coerce_number(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("inf"))), 0.0);
        assert_eq!(coerce_number(Some(&json!(true))), 0.0);
        assert_eq!(coerce_number(Some(&json!([1]))), 0.0);
        assert_eq!(coerce_number(None), 0.0);
    }

    #[test]
    fn test_enum_or() {
        assert_eq!(enum_or(Some(&json!("high")), Level::Medium), Level::High);
        assert_eq!(enum_or(None, Level::Low), Level::Low);
        assert_eq!(enum_or(Some(&json!("")), Level::Low), Level::Low);
        assert_eq!(enum_or(Some(&json!(3)), Level::Low), Level::Low);
        assert_eq!(
            enum_or(Some(&json!("urgent")), Level::Medium),
            Level::Unrecognized("urgent".into())
        );
    }

    #[test]
    fn test_array_and_text_list() {
        assert_eq!(array(Some(&json!([1, 2]))).len(), 2);
        assert!(array(Some(&json!({"a": 1}))).is_empty());
        assert!(array(None).is_empty());
        assert_eq!(
            text_list(Some(&json!(["a", 2, null]))),
            vec!["a".to_string(), "2".to_string(), String::new()]
        );
    }
}
