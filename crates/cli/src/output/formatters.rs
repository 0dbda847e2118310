//! Output formatters

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// JSON formatter
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format a value as pretty JSON
    pub fn format<T: Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

/// Plain text formatter, one `key: value` per line
pub struct PlainFormatter;

impl PlainFormatter {
    /// Format a value as indented `key: value` lines
    pub fn format<T: Serialize>(value: &T) -> Result<String> {
        let json = serde_json::to_value(value)?;
        let mut lines = Vec::new();
        Self::collect(&json, 0, &mut lines);
        Ok(lines.join("\n"))
    }

    fn collect(value: &Value, indent: usize, lines: &mut Vec<String>) {
        let pad = "  ".repeat(indent);
        match value {
            Value::Object(obj) => {
                for (key, value) in obj {
                    if value.is_object() {
                        lines.push(format!("{}{}:", pad, key));
                        Self::collect(value, indent + 1, lines);
                    } else {
                        lines.push(format!("{}{}: {}", pad, key, Self::scalar(value)));
                    }
                }
            }
            other => lines.push(format!("{}{}", pad, Self::scalar(other))),
        }
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::Null => "-".to_string(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items.iter().map(Self::scalar).collect::<Vec<_>>().join(";"),
            other => other.to_string(),
        }
    }
}
