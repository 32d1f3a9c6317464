//! Schema-less trait values
//!
//! A fingerprint is an arbitrary-depth bag of traits. [`TraitValue`] is the
//! tagged representation every engine component dispatches on; [`TraitRecord`]
//! keeps entries in the order they were supplied so traversal is reproducible.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// An insertion-ordered mapping from trait names to values
pub type TraitRecord = IndexMap<String, TraitValue>;

/// A single trait value
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<TraitValue>),
    Record(TraitRecord),
}

impl TraitValue {
    /// Canonical string form used as the `value` half of a token.
    ///
    /// Sequences and records only reach this when they are elements of a
    /// sequence. Nested sequences join their elements with `,` and render
    /// null elements as empty text; records render as `[object Object]`.
    pub fn canonical(&self) -> String {
        match self {
            TraitValue::Null => "null".to_string(),
            TraitValue::Bool(b) => b.to_string(),
            TraitValue::Number(n) => format_number(*n),
            TraitValue::String(s) => s.clone(),
            TraitValue::Sequence(items) => join_sequence(items),
            TraitValue::Record(_) => OBJECT_TEXT.to_string(),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, TraitValue::Null)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TraitValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TraitValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_sequence(&self) -> Option<&[TraitValue]> {
        match self {
            TraitValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&TraitRecord> {
        match self {
            TraitValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<TraitRecord> {
        match self {
            TraitValue::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Look up a key when this value is a record
    pub fn get(&self, key: &str) -> Option<&TraitValue> {
        self.as_record().and_then(|r| r.get(key))
    }
}

const OBJECT_TEXT: &str = "[object Object]";

fn join_sequence(items: &[TraitValue]) -> String {
    items
        .iter()
        .map(|item| match item {
            TraitValue::Null => String::new(),
            other => other.canonical(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Shortest round-trip digits, laid out the way ECMAScript `Number::toString`
/// does: plain decimal for magnitudes in [1e-6, 1e21), exponent form
/// (`1e-7`, `1.5e+21`) outside it.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let sign = if n < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest digits, e.g. "1.2345e2"
    let sci = format!("{:e}", n.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    // decimal point sits after `point` digits
    let point = exp.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let e = point - 1;
        let e_sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, e_sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, e_sign, e.abs())
        }
    };

    format!("{}{}", sign, body)
}

fn integral_i64(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Some(n as i64)
    } else {
        None
    }
}

impl Serialize for TraitValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TraitValue::Null => serializer.serialize_unit(),
            TraitValue::Bool(b) => serializer.serialize_bool(*b),
            TraitValue::Number(n) => match integral_i64(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            TraitValue::String(s) => serializer.serialize_str(s),
            TraitValue::Sequence(items) => items.serialize(serializer),
            TraitValue::Record(record) => record.serialize(serializer),
        }
    }
}

impl From<serde_json::Value> for TraitValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => TraitValue::Null,
            serde_json::Value::Bool(b) => TraitValue::Bool(b),
            serde_json::Value::Number(n) => TraitValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => TraitValue::String(s),
            serde_json::Value::Array(items) => {
                TraitValue::Sequence(items.into_iter().map(TraitValue::from).collect())
            }
            serde_json::Value::Object(map) => TraitValue::Record(
                map.into_iter().map(|(k, v)| (k, TraitValue::from(v))).collect(),
            ),
        }
    }
}

impl From<TraitValue> for serde_json::Value {
    fn from(value: TraitValue) -> Self {
        match value {
            TraitValue::Null => serde_json::Value::Null,
            TraitValue::Bool(b) => serde_json::Value::Bool(b),
            TraitValue::Number(n) => match integral_i64(n) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            TraitValue::String(s) => serde_json::Value::String(s),
            TraitValue::Sequence(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            TraitValue::Record(record) => serde_json::Value::Object(
                record.into_iter().map(|(k, v)| (k, serde_json::Value::from(v))).collect(),
            ),
        }
    }
}

impl From<TraitRecord> for TraitValue {
    fn from(record: TraitRecord) -> Self {
        TraitValue::Record(record)
    }
}

impl From<&str> for TraitValue {
    fn from(s: &str) -> Self {
        TraitValue::String(s.to_string())
    }
}

impl From<String> for TraitValue {
    fn from(s: String) -> Self {
        TraitValue::String(s)
    }
}

impl From<f64> for TraitValue {
    fn from(n: f64) -> Self {
        TraitValue::Number(n)
    }
}

impl From<i64> for TraitValue {
    fn from(n: i64) -> Self {
        TraitValue::Number(n as f64)
    }
}

impl From<u32> for TraitValue {
    fn from(n: u32) -> Self {
        TraitValue::Number(n as f64)
    }
}

impl From<bool> for TraitValue {
    fn from(b: bool) -> Self {
        TraitValue::Bool(b)
    }
}

impl<T: Into<TraitValue>> From<Vec<T>> for TraitValue {
    fn from(items: Vec<T>) -> Self {
        TraitValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<TraitValue>> From<Option<T>> for TraitValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(TraitValue::Null)
    }
}

/// Convert a JSON object into a trait record. Non-object values yield `None`.
pub fn record_from_json(value: serde_json::Value) -> Option<TraitRecord> {
    TraitValue::from(value).into_record()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_numbers() {
        assert_eq!(TraitValue::Number(3.0).canonical(), "3");
        assert_eq!(TraitValue::Number(-2.0).canonical(), "-2");
        assert_eq!(TraitValue::Number(1.5).canonical(), "1.5");
        assert_eq!(TraitValue::Number(-0.0).canonical(), "0");
        assert_eq!(TraitValue::Number(f64::NAN).canonical(), "NaN");
        assert_eq!(TraitValue::Number(f64::NEG_INFINITY).canonical(), "-Infinity");
    }

    #[test]
    fn test_canonical_numbers_exponent_form() {
        assert_eq!(TraitValue::Number(1e-7).canonical(), "1e-7");
        assert_eq!(TraitValue::Number(1.5e-7).canonical(), "1.5e-7");
        assert_eq!(TraitValue::Number(0.000001).canonical(), "0.000001");
        assert_eq!(TraitValue::Number(0.1).canonical(), "0.1");
        assert_eq!(TraitValue::Number(123.456).canonical(), "123.456");
        assert_eq!(TraitValue::Number(1e20).canonical(), "100000000000000000000");
        assert_eq!(TraitValue::Number(1e21).canonical(), "1e+21");
        assert_eq!(TraitValue::Number(-2.5e22).canonical(), "-2.5e+22");
        assert_eq!(TraitValue::Number(f64::MAX).canonical(), "1.7976931348623157e+308");
        assert_eq!(TraitValue::Number(5e-324).canonical(), "5e-324");
    }

    #[test]
    fn test_canonical_scalars_and_nested() {
        assert_eq!(TraitValue::Null.canonical(), "null");
        assert_eq!(TraitValue::Bool(true).canonical(), "true");
        assert_eq!(TraitValue::from("Arial").canonical(), "Arial");
        assert_eq!(TraitValue::from(vec![1i64, 2]).canonical(), "1,2");
        assert_eq!(TraitValue::from(json!([null, 1, [null, "x"]])).canonical(), ",1,,x");

        let nested = TraitValue::from(json!({"a": 1}));
        assert_eq!(nested.canonical(), "[object Object]");
    }

    #[test]
    fn test_json_preserves_key_order() {
        let record = record_from_json(json!({"zeta": 1, "alpha": 2, "mid": 3})).unwrap();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_serde_integral_numbers() {
        let value: TraitValue = serde_json::from_str(r#"{"cats": 3, "ratio": 1.25, "x": null}"#).unwrap();
        assert_eq!(value.get("cats"), Some(&TraitValue::Number(3.0)));
        assert_eq!(value.get("x"), Some(&TraitValue::Null));

        let out = serde_json::to_string(&value).unwrap();
        assert_eq!(out, r#"{"cats":3,"ratio":1.25,"x":null}"#);
    }

    #[test]
    fn test_non_object_is_not_a_record() {
        assert!(record_from_json(json!([1, 2])).is_none());
        assert!(record_from_json(json!("text")).is_none());
    }
}
