//! Output formatting for the CLI.

use clap::ValueEnum;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format.
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            } else {
                println!("{}", value);
            }
        }
    }
}

fn status_line(status: &str, message: &str) -> String {
    serde_json::json!({ "status": status, "message": message }).to_string()
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => println!("{}", status_line("success", message)),
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => eprintln!("{}", status_line("error", message)),
    }
}

/// Format a labelled row.
pub fn row(label: &str, value: &str) -> String {
    format!("{:<10} {}", format!("{}:", label), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_escapes_message() {
        let line = status_line("error", "Email \"a\" tidak valid");
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["message"], "Email \"a\" tidak valid");
    }

    #[test]
    fn test_row_alignment() {
        assert_eq!(row("Role", "admin"), "Role:      admin");
        assert_eq!(row("Status", "anonymous"), "Status:    anonymous");
    }
}
