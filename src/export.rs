//! CSV serialization of a cache slot

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("No data to export")]
    NoData,

    #[error("Failed to serialize record: {0}")]
    Serialize(String),
}

/// Render records as CSV.
///
/// The header row is the field names of the first record in declaration
/// order. Every value is quoted (embedded quotes doubled) and nulls become
/// empty strings. An empty slice is an error rather than a header-less file.
pub fn to_csv<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let rows: Vec<serde_json::Map<String, Value>> = records
        .iter()
        .map(|r| match serde_json::to_value(r) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ExportError::Serialize(format!("expected object, got {}", other))),
            Err(e) => Err(ExportError::Serialize(e.to_string())),
        })
        .collect::<Result<_, _>>()?;

    let first = rows.first().ok_or(ExportError::NoData)?;
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in &rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| quote(&cell_text(row.get(*h))))
            .collect();
        lines.push(cells.join(","));
    }

    Ok(lines.join("\n"))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
