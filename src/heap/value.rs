//! Host values and their equality rules

use super::ObjectId;

/// Any value reachable in the graph.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(ObjectId),
}

impl Value {
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Host truthiness: `0`, `NaN`, `""`, `false`, null and undefined are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// SameValueZero: strict equality, except that `NaN` equals `NaN`.
    ///
    /// Objects compare by identity and `+0` equals `-0`.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

/// Format a number the way the host prints it.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        // covers -0
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_matches_nan() {
        let nan = Value::Number(f64::NAN);
        assert!(nan.same_value_zero(&Value::Number(f64::NAN)));
    }

    #[test]
    fn test_signed_zeros_match() {
        assert!(Value::Number(0.0).same_value_zero(&Value::Number(-0.0)));
    }

    #[test]
    fn test_no_coercion_between_types() {
        assert!(!Value::from("12").same_value_zero(&Value::from(12)));
        assert!(!Value::Null.same_value_zero(&Value::Undefined));
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let a = Value::Object(ObjectId::from_index(1));
        assert!(a.same_value_zero(&Value::Object(ObjectId::from_index(1))));
        assert!(!a.same_value_zero(&Value::Object(ObjectId::from_index(2))));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::Object(ObjectId::from_index(0)).is_truthy());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }
}
