//! Output formatting for index results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output grouped by source file
//! - JSON: the full registry and diagnostics for programmatic consumption

use std::fmt::Write as _;

use colored::*;
use serde::Serialize;

use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::registry::{DeclarationRecord, SourceRegistry};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report of one index build.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: String,
    pub lookup_path: String,
    pub files_indexed: usize,
    pub summary: JsonSummary,
    pub records: &'a [DeclarationRecord],
    pub diagnostics: &'a [Diagnostic],
}

/// Record and diagnostic counts.
#[derive(Serialize)]
pub struct JsonSummary {
    pub records: usize,
    pub errors: usize,
    pub warnings: usize,
}

pub fn json_report<'a>(
    lookup_path: &str,
    registry: &'a SourceRegistry,
    diagnostics: &'a Diagnostics,
) -> JsonReport<'a> {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        lookup_path: lookup_path.to_string(),
        files_indexed: source_files(registry).len(),
        summary: JsonSummary {
            records: registry.len(),
            errors: diagnostics.count(Severity::Error),
            warnings: diagnostics.count(Severity::Warning),
        },
        records: registry.records(),
        diagnostics: diagnostics.items(),
    }
}

/// Write results in JSON format.
pub fn write_json(
    lookup_path: &str,
    registry: &SourceRegistry,
    diagnostics: &Diagnostics,
) -> anyhow::Result<()> {
    let report = json_report(lookup_path, registry, diagnostics);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Distinct source files in registry order.
fn source_files(registry: &SourceRegistry) -> Vec<&str> {
    let mut files: Vec<&str> = Vec::new();
    for record in registry.records() {
        if !files.contains(&record.source_file.as_str()) {
            files.push(&record.source_file);
        }
    }
    files
}

/// Render the colored report as a string.
pub fn render_pretty(
    lookup_path: &str,
    registry: &SourceRegistry,
    diagnostics: &Diagnostics,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} v{}",
        "soldoc".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}{}", "Indexing: ".dimmed(), lookup_path);
    let _ = writeln!(out);

    for file in source_files(registry) {
        let _ = writeln!(out, "  {}", file.blue());
        for record in registry.by_source_file(file) {
            write_record(&mut out, record);
        }
        let _ = writeln!(out);
    }

    if !diagnostics.is_empty() {
        write_diagnostics(&mut out, diagnostics.items());
    }

    write_summary(&mut out, registry, diagnostics);
    out
}

/// Write results in pretty format.
pub fn write_pretty(lookup_path: &str, registry: &SourceRegistry, diagnostics: &Diagnostics) {
    print!("{}", render_pretty(lookup_path, registry, diagnostics));
}

fn write_record(out: &mut String, record: &DeclarationRecord) {
    let indent = if record.enclosing_contract.is_some() { "      " } else { "    " };
    let line = format!(":{}", record.line);
    let _ = writeln!(
        out,
        "{}{:<12}{}  {}",
        indent,
        record.kind.as_str().dimmed(),
        record.signature,
        line.dimmed()
    );
}

fn write_diagnostics(out: &mut String, diagnostics: &[Diagnostic]) {
    let _ = writeln!(out, "  {} ({}):", "Diagnostics".bold(), diagnostics.len());
    let _ = writeln!(out);

    for d in diagnostics {
        let tag = match d.severity {
            Severity::Error => "ERROR".red(),
            Severity::Warning => "WARN ".yellow(),
            Severity::Info => "INFO ".blue(),
        };
        let _ = write!(out, "    {} ", tag);
        match d.location() {
            Some(location) => {
                let _ = writeln!(out, "{}", location.blue());
            }
            None => {
                let _ = writeln!(out);
            }
        }
        // Message on next line, indented
        for line in d.message.lines() {
            let _ = writeln!(out, "            {}", line);
        }
        let _ = writeln!(out);
    }
}

fn write_summary(out: &mut String, registry: &SourceRegistry, diagnostics: &Diagnostics) {
    let errors = diagnostics.count(Severity::Error);
    let warnings = diagnostics.count(Severity::Warning);

    let status = if errors > 0 {
        "✗ ERRORS".red()
    } else {
        "✓ OK".green()
    };
    let _ = writeln!(
        out,
        "  {}  {} records in {} files  {}",
        status,
        registry.len(),
        source_files(registry).len(),
        format!("({} errors, {} warnings)", errors, warnings).dimmed()
    );
}
