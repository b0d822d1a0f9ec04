//! Output formatting for the status record.
//!
//! Text output is the `field-name=value` line format; JSON output is one
//! object with the same hyphenated keys in the same order.

use anyhow::{Context, Result};

use evscrape_types::VehicleStatusRecord;

use crate::cli::OutputFormat;

/// Render a record in the requested format, newline-terminated.
pub fn format_record(record: &VehicleStatusRecord, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(record.to_string()),
        OutputFormat::Json => format_record_json(record),
    }
}

/// Format a record as pretty-printed JSON.
pub fn format_record_json(record: &VehicleStatusRecord) -> Result<String> {
    let mut json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;
    json.push('\n');
    Ok(json)
}
