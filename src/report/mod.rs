//! Reporting of analysis results.
//!
//! Renders a module's export surface either as human-readable text or as a
//! JSON document keyed the way downstream tooling expects (camelCase, with
//! the file path alongside the surface itself).

use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::ModuleExports;

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Plain text - human-readable
    Text,
    /// JSON - machine-readable
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!(
                "Unknown report format: '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    #[serde(flatten)]
    exports: &'a ModuleExports,
}

/// Write a report for one analyzed file in the given format.
pub fn report<W: Write>(
    exports: &ModuleExports,
    file: &str,
    format: ReportFormat,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ReportFormat::Text => report_text(exports, file, writer),
        ReportFormat::Json => {
            let document = JsonReport { file, exports };
            serde_json::to_writer_pretty(&mut *writer, &document)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer)
        }
    }
}

fn report_text<W: Write>(exports: &ModuleExports, file: &str, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Results for {}:", file)?;
    if exports.named_exports.is_empty() {
        writeln!(writer, "  named exports: (none)")?;
    } else {
        writeln!(writer, "  named exports: {}", exports.named_exports.join(", "))?;
    }
    if exports.has_default_export {
        match &exports.default_export_name {
            Some(name) => writeln!(writer, "  default export: {}", name)?,
            None => writeln!(writer, "  default export: (unnamed)")?,
        }
    } else {
        writeln!(writer, "  default export: (none)")?;
    }
    Ok(())
}

/// Render a report to a string.
pub fn report_to_string(
    exports: &ModuleExports,
    file: &str,
    format: ReportFormat,
) -> io::Result<String> {
    let mut buffer = Vec::new();
    report(exports, file, format, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
