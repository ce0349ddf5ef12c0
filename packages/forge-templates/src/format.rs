//! Number, size and JSON formatting.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const IEC_UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

/// Human readable byte size using IEC units (`1023 B`, `1.0 KiB`, `15 KiB`)
pub fn file_size(size: u64) -> String {
    if size < 10 {
        return format!("{} B", size);
    }
    let mut exp = 0usize;
    let mut unit = 1u64;
    while exp < IEC_UNITS.len() - 1 && size / unit >= 1024 {
        unit *= 1024;
        exp += 1;
    }
    let value = ((size as f64 / unit as f64) * 10.0 + 0.5).floor() / 10.0;
    if value < 10.0 {
        format!("{:.1} {}", value, IEC_UNITS[exp])
    } else {
        format!("{:.0} {}", value, IEC_UNITS[exp])
    }
}

/// Group digits in threes with commas
pub fn pretty_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact SI count (`999`, `1.5k`, `2.0M`, `3.1G`)
pub fn format_number_si(n: i64) -> String {
    match n {
        n if n < 1_000 => n.to_string(),
        n if n < 1_000_000 => format!("{:.1}k", n as f32 / 1_000.0),
        n if n < 1_000_000_000 => format!("{:.1}M", n as f32 / 1_000_000.0),
        n => format!("{:.1}G", n as f32 / 1_000_000_000.0),
    }
}

/// `left - right`, integral when both operands are integers
pub fn subtract(left: &Value, right: &Value) -> Option<Value> {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return Some(Value::from(l.wrapping_sub(r)));
    }
    let (l, r) = (left.as_f64()?, right.as_f64()?);
    Some(Value::from(l - r))
}

/// Sum with two's-complement wrap on overflow
pub fn add(values: &[i64]) -> i64 {
    values.iter().copied().fold(0, i64::wrapping_add)
}

/// Product with two's-complement wrap on overflow
pub fn mul(values: &[i64]) -> i64 {
    values.iter().copied().fold(1, i64::wrapping_mul)
}

/// Share of `n` in the sum of `values`, in percent; 0 for an empty total
pub fn percentage(n: i64, values: &[i64]) -> f32 {
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    if sum == 0.0 {
        return 0.0;
    }
    (n as f64 * 100.0 / sum) as f32
}

/// Serialize to JSON text
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Serialize to JSON text, or an empty string when serialization fails
pub fn json_or_empty<T: Serialize + ?Sized>(value: &T) -> String {
    to_json(value).unwrap_or_else(|e| {
        debug!("json encode failed: {}", e);
        String::new()
    })
}

/// Re-indent a JSON document with two spaces; empty string when `input` is not JSON
pub fn json_pretty_print(input: &str) -> String {
    serde_json::from_str::<Value>(input)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|e| {
            debug!("json pretty print failed: {}", e);
            String::new()
        })
}
