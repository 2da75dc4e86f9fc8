use serde::de::DeserializeOwned;
use serde_json::Value;

pub const LIST_DELIMITER: char = ',';

/// Result of a decode that never fails: either the clean value or the
/// default it fell back to, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Lenient<T> {
    Clean(T),
    Recovered { value: T, reason: String },
}

impl<T> Lenient<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Clean(value) | Self::Recovered { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Clean(value) | Self::Recovered { value, .. } => value,
        }
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lenient<U> {
        match self {
            Self::Clean(value) => Lenient::Clean(f(value)),
            Self::Recovered { value, reason } => Lenient::Recovered {
                value: f(value),
                reason,
            },
        }
    }
}

/// Arrays become a comma-joined string; strings pass through.
pub fn join_list(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Value::String(parts.join(&LIST_DELIMITER.to_string()))
        }
        Value::String(_) => value.clone(),
        Value::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

/// Splits a comma-joined backend list. Items are trimmed and empties dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a comma-joined sequence where every position counts, blank or not.
/// Only an entirely blank value is empty.
pub fn split_sequence(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(LIST_DELIMITER).map(|item| item.trim().to_string()).collect()
}

/// Structured values are JSON-encoded; strings are assumed already encoded.
pub fn encode_json(value: &Value) -> Value {
    match value {
        Value::String(_) | Value::Null => value.clone(),
        other => Value::String(other.to_string()),
    }
}

/// Decodes a JSON field that may arrive encoded or already structured.
/// Malformed or mistyped input falls back to `T::default()`.
pub fn decode_lenient<T>(raw: &Value) -> Lenient<T>
where
    T: DeserializeOwned + Default,
{
    let decoded = match raw {
        Value::Null => return Lenient::Clean(T::default()),
        Value::String(s) if s.trim().is_empty() => return Lenient::Clean(T::default()),
        Value::String(s) => serde_json::from_str(s),
        other => serde_json::from_value(other.clone()),
    };
    match decoded {
        Ok(value) => Lenient::Clean(value),
        Err(e) => Lenient::Recovered {
            value: T::default(),
            reason: e.to_string(),
        },
    }
}

/// Integers may arrive as numbers or numeric strings.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}
