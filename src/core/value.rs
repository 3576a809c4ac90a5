use serde_json::Value;
use std::cmp::Ordering;

/// Keys used by database exports to wrap numbers, e.g. `{ "$numberInt": "500" }`.
const WRAPPED_NUMBER_KEYS: [&str; 4] = ["$numberInt", "$numberLong", "$numberDouble", "$numberDecimal"];

/// Normalize a loosely typed JSON field to a number.
///
/// Accepts plain numbers, numeric strings and the wrapped export shapes.
/// Missing, null, non-finite or unparseable values become `0.0`.
pub fn numeric(value: Option<&Value>) -> f64 {
    try_numeric(value).unwrap_or(0.0)
}

/// Like [`numeric`] but reports failure instead of falling back to zero.
pub fn try_numeric(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => {
            let inner = WRAPPED_NUMBER_KEYS.iter().find_map(|key| map.get(*key))?;
            // The wrapper never nests, only strings and numbers are valid inside
            match inner {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
        }
        _ => None,
    };

    parsed.filter(|n| n.is_finite())
}

/// Normalize a count-like field (non-negative integer).
pub fn count(value: Option<&Value>) -> Option<u64> {
    let n = try_numeric(value)?;
    if n < 0.0 || n.fract() != 0.0 {
        return None;
    }
    Some(n as u64)
}

/// Total order over normalized numbers. Inputs are always finite.
#[inline]
pub fn compare_numeric(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_and_wrapped_agree() {
        let plain = json!(500);
        let wrapped = json!({ "$numberInt": "500" });
        assert_eq!(numeric(Some(&plain)), 500.0);
        assert_eq!(numeric(Some(&wrapped)), 500.0);
    }

    #[test]
    fn test_other_wrappers() {
        assert_eq!(numeric(Some(&json!({ "$numberLong": "9000000000" }))), 9_000_000_000.0);
        assert_eq!(numeric(Some(&json!({ "$numberDouble": "12.5" }))), 12.5);
        assert_eq!(numeric(Some(&json!({ "$numberDecimal": " 3 " }))), 3.0);
    }

    #[test]
    fn test_fallback_to_zero() {
        assert_eq!(numeric(None), 0.0);
        assert_eq!(numeric(Some(&Value::Null)), 0.0);
        assert_eq!(numeric(Some(&json!("cheap"))), 0.0);
        assert_eq!(numeric(Some(&json!({ "$numberInt": "abc" }))), 0.0);
        assert_eq!(numeric(Some(&json!({ "$numberDouble": "NaN" }))), 0.0);
        assert_eq!(numeric(Some(&json!({ "amount": 5 }))), 0.0);
        assert_eq!(numeric(Some(&json!([1, 2]))), 0.0);
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(numeric(Some(&json!("1200"))), 1200.0);
        assert_eq!(numeric(Some(&json!(" 7.5 "))), 7.5);
    }

    #[test]
    fn test_count() {
        assert_eq!(count(Some(&json!(25))), Some(25));
        assert_eq!(count(Some(&json!({ "$numberInt": "3" }))), Some(3));
        assert_eq!(count(Some(&json!(-1))), None);
        assert_eq!(count(Some(&json!(2.5))), None);
        assert_eq!(count(None), None);
    }
}
