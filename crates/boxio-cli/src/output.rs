//! Output formatting for CLI results
//!
//! Provides human-readable and JSON output of the run's outcome and of
//! errors raised before the sync starts.

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    /// Final outcome of the run
    fn outcome(&self, success: bool);
    fn error(&self, message: &str);
}

/// Plain text: the outcome line on its own, errors prefixed with a cross
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn outcome(&self, success: bool) {
        if success {
            println!("Success!");
        } else {
            eprintln!("Failed!");
        }
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn outcome(&self, success: bool) {
        let value = serde_json::json!({ "success": success });
        if success {
            println!("{}", value);
        } else {
            eprintln!("{}", value);
        }
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}
