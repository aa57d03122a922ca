use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

use crate::envelope::Report;
use crate::error::{InvokeError, Result};

pub const FORMATS: &[&str] = &["text", "json", "yaml", "table"];

pub fn check_format(format: &str) -> Result<()> {
    if FORMATS.contains(&format) {
        Ok(())
    } else {
        Err(InvokeError::Input(format!(
            "Unknown output format '{format}'. Valid formats: {}",
            FORMATS.join(", ")
        )))
    }
}

fn pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).map_err(|e| InvokeError::Input(format!("YAML output failed: {e}")))
}

fn text_report(report: &Report) -> Result<String> {
    let mut lines = vec![String::new(), format!("Status Code:  {}", report.status_code())];
    match report {
        Report::Success { attributes, .. } => {
            lines.push("Body:".into());
            match attributes {
                Some(value) => lines.push(pretty(value)?),
                None => lines.push("null".into()),
            }
        }
        Report::Failure {
            error_type,
            message,
            ..
        } => {
            lines.push(format!("Error Type:  {error_type}"));
            lines.push(format!("Message:  {message}"));
        }
    }
    lines.push(String::new());
    Ok(lines.join("\n") + "\n")
}

fn table_report(report: &Report) -> Result<String> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Status Code".to_string(), report.status_code().to_string()]);
    match report {
        Report::Success { attributes, .. } => {
            let body = match attributes {
                Some(value) => pretty(value)?,
                None => "null".into(),
            };
            table.add_row(vec!["Body".to_string(), body]);
        }
        Report::Failure {
            error_type,
            message,
            ..
        } => {
            table.add_row(vec!["Error Type".to_string(), error_type.clone()]);
            table.add_row(vec!["Message".to_string(), message.clone()]);
        }
    }
    Ok(format!("{table}\n"))
}

/// Renders an invocation report in the requested format.
pub fn format_report(report: &Report, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(report)? + "\n"),
        "yaml" => yaml(report),
        "table" => table_report(report),
        _ => text_report(report),
    }
}

/// Renders a plain JSON value, used for the merged request.
pub fn format_value(data: &Value, format: &str) -> Result<String> {
    match format {
        "yaml" => yaml(data),
        _ => Ok(pretty(data)? + "\n"),
    }
}

pub fn print_success(msg: &str) {
    use colored::Colorize;
    println!("{}", msg.green());
}

pub fn print_error(msg: &str) {
    use colored::Colorize;
    eprintln!("{}", msg.red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_report_pretty_prints_attributes() {
        let report = Report::Success {
            status_code: 200,
            attributes: Some(json!({"x": 1})),
        };
        assert_eq!(
            format_report(&report, "text").unwrap(),
            "\nStatus Code:  200\nBody:\n{\n  \"x\": 1\n}\n\n"
        );
    }

    #[test]
    fn empty_attributes_print_null() {
        let report = Report::Success {
            status_code: 200,
            attributes: None,
        };
        let text = format_report(&report, "text").unwrap();
        assert!(text.lines().any(|l| l == "null"));
    }

    #[test]
    fn failure_report_shows_type_and_message() {
        let report = Report::Failure {
            status_code: 400,
            error_type: "ValidationError".into(),
            message: "bad input".into(),
        };
        assert_eq!(
            format_report(&report, "text").unwrap(),
            "\nStatus Code:  400\nError Type:  ValidationError\nMessage:  bad input\n\n"
        );
    }

    #[test]
    fn json_report_is_tagged() {
        let report = Report::Failure {
            status_code: 502,
            error_type: "InternalFailure".into(),
            message: "down".into(),
        };
        let value: Value = serde_json::from_str(&format_report(&report, "json").unwrap()).unwrap();
        assert_eq!(value["outcome"], "failure");
        assert_eq!(value["status_code"], 502);
    }

    #[test]
    fn table_report_lists_fields() {
        let report = Report::Failure {
            status_code: 404,
            error_type: "NotFound".into(),
            message: "no shipment".into(),
        };
        let table = format_report(&report, "table").unwrap();
        assert!(table.contains("Error Type"));
        assert!(table.contains("no shipment"));
    }

    #[test]
    fn yaml_value_output() {
        let out = format_value(&json!({"httpMethod": "POST"}), "yaml").unwrap();
        assert_eq!(out.trim(), "httpMethod: POST");
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(check_format("wide").is_err());
        assert!(check_format("table").is_ok());
    }
}
