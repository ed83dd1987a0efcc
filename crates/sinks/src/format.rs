//! Row encoding for file output.

use serde_json::Value;

use crate::config::OutputFormat;

/// Column used for records that are not JSON objects.
pub const VALUE_COLUMN: &str = "value";

/// Encodes rows in the given format.
pub fn encode(format: OutputFormat, rows: &[Value]) -> Result<Vec<u8>, serde_json::Error> {
    match format {
        OutputFormat::Json => json_lines(rows),
        OutputFormat::Csv => Ok(csv(rows).into_bytes()),
    }
}

/// One compact JSON document per line.
pub fn json_lines(rows: &[Value]) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.push(b'\n');
    }
    Ok(out)
}

/// CSV with a header row. Columns are the union of keys in the order they
/// are first seen; missing cells are empty.
pub fn csv(rows: &[Value]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        match row {
            Value::Object(map) => {
                for key in map.keys() {
                    if !columns.contains(&key.as_str()) {
                        columns.push(key);
                    }
                }
            }
            _ => {
                if !columns.contains(&VALUE_COLUMN) {
                    columns.push(VALUE_COLUMN);
                }
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| escape_field(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| match row {
                Value::Object(map) => map.get(*col).map(csv_escape).unwrap_or_default(),
                other if *col == VALUE_COLUMN => csv_escape(other),
                _ => String::new(),
            })
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }

    out
}

/// Removes `cols` from an object row and returns their values.
/// Non-object rows and absent keys yield `None` for that column.
pub fn split_partition(row: &mut Value, cols: &[String]) -> Vec<Option<Value>> {
    match row {
        Value::Object(map) => cols.iter().map(|c| map.remove(c)).collect(),
        _ => vec![None; cols.len()],
    }
}

/// Renders a partition value for a `col=value` directory name.
pub fn partition_label(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => return "__missing__".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    raw.chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}

fn csv_escape(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape_field(s),
        other => escape_field(&other.to_string()),
    }
}

fn escape_field(s: &str) -> String {
    if s.contains(',') || s.contains('\n') || s.contains('\r') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
