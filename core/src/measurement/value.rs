use serde::{Deserialize, Serialize};

/// A raw measurement as it arrived from the data source.
///
/// Values are kept unmodified so that coercion happens only when projecting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Number(f64),
    Text(String),
    Unreadable(serde_json::Value),
}

impl MeasureValue {
    /// Numeric reading of the value. Anything that cannot be plotted reads as `0`.
    pub fn as_plot_value(&self) -> f64 {
        self.as_finite().unwrap_or(0.0)
    }

    /// `None` when the value would be coerced to zero for plotting.
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            MeasureValue::Number(value) if value.is_finite() => Some(*value),
            MeasureValue::Number(_) => None,
            MeasureValue::Text(text) => leading_number(text),
            MeasureValue::Unreadable(_) => None,
        }
    }
}

impl From<f64> for MeasureValue {
    fn from(value: f64) -> Self {
        MeasureValue::Number(value)
    }
}

impl From<i64> for MeasureValue {
    fn from(value: i64) -> Self {
        MeasureValue::Number(value as f64)
    }
}

impl From<&str> for MeasureValue {
    fn from(value: &str) -> Self {
        MeasureValue::Text(value.to_string())
    }
}

/// Parses the longest numeral prefix of `text` after leading whitespace.
fn leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
