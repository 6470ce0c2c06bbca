//! Small shared helpers for the HTTP adapters.

use tw_domain::Error;

/// Map a reqwest error onto the shared error type.
pub(crate) fn from_reqwest(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else {
        Error::Transport(err.to_string())
    }
}

/// Dig a string field out of a JSON value, tolerating absence.
pub(crate) fn json_str(value: &serde_json::Value, field: &str) -> String {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Parse a numeric field that Amap may report as string, number, or `[]`.
pub(crate) fn json_num(value: &serde_json::Value, field: &str) -> Option<f64> {
    match value.get(field)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
