//! Plain-text attribute tables for identifiers and properties

use crate::models::AttributeMap;
use serde_json::Value;

/// Rendering options for [`format_attribute_table`]
#[derive(Debug, Clone)]
pub struct TableStyle {
    /// Digits after the decimal point for non-integer numbers
    pub float_precision: usize,
    /// Include rows whose value is null
    pub print_none: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            float_precision: 2,
            print_none: false,
        }
    }
}

/// Two aligned columns: key (underscores shown as spaces) and value
pub fn format_attribute_table(attributes: &AttributeMap, style: &TableStyle) -> String {
    let rows: Vec<(String, String)> = attributes
        .iter()
        .filter(|(_, value)| style.print_none || !value.is_null())
        .map(|(key, value)| (key.replace('_', " "), format_value(value, style)))
        .collect();

    let width = rows.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);

    rows.iter()
        .map(|(key, value)| format!("{:<width$}\t{}\n", key, value, width = width))
        .collect()
}

fn format_value(value: &Value, style: &TableStyle) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => format!("{:.*}", style.float_precision, f),
            None => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| format_value(item, style))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
