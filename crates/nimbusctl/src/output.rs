//! Output rendering for result records and raw values

use comfy_table::Table;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result as CliResult;

#[derive(Debug, Clone, Copy, clap::ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for humans, unless the data has no tabular shape
    #[default]
    Auto,
    Json,
    Yaml,
    Table,
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> CliResult<()> {
    let json_value = serde_json::to_value(data)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json_value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&json_value)?),
        OutputFormat::Auto | OutputFormat::Table => print_as_table(&json_value),
    }
    Ok(())
}

fn print_as_table(value: &Value) {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();
            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);
                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }
            println!("{table}");
        }
        Value::Array(_) => println!("(no results)"),
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);
            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }
            println!("{table}");
        }
        _ => println!("{}", format_value(value)),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value_scalars() {
        assert_eq!(format_value(&Value::Null), "");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!("west-2")), "west-2");
    }

    #[test]
    fn test_format_value_composites_are_summarized() {
        assert_eq!(format_value(&json!([1, 2, 3])), "[3 items]");
        assert_eq!(format_value(&json!({"a": 1})), "{1 fields}");
    }

    #[test]
    fn test_print_output_never_fails_on_records() {
        let records = json!([
            {"imageName": "a", "location": "west-2"},
            {"imageName": "b", "location": "east-1"}
        ]);
        assert!(print_output(&records, OutputFormat::Json).is_ok());
        assert!(print_output(&records, OutputFormat::Yaml).is_ok());
        assert!(print_output(&records, OutputFormat::Table).is_ok());
        assert!(print_output(json!([]), OutputFormat::Auto).is_ok());
    }
}
