//! Diagnostics emitted while building the source index.

use serde::{Deserialize, Serialize};

use crate::error::SolidityError;

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A non-fatal problem found during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Source file relative to the lookup root, when the problem has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// 1-indexed line; 0 when unknown.
    #[serde(default)]
    pub line: usize,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: None,
            line: 0,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn at(mut self, file: &str, line: usize) -> Self {
        self.file = Some(file.to_string());
        self.line = line;
        self
    }

    /// Error diagnostic for a file that failed to index.
    pub fn from_file_error(file: &str, err: &SolidityError) -> Self {
        let line = match err {
            SolidityError::NestingViolation { line, .. } => *line,
            _ => 0,
        };
        Self::error(format!("{} skipped: {}", file, err)).at(file, line)
    }

    /// `file:line` or `file` prefix used when printing.
    pub fn location(&self) -> Option<String> {
        self.file.as_ref().map(|file| {
            if self.line > 0 {
                format!("{}:{}", file, self.line)
            } else {
                file.clone()
            }
        })
    }
}

/// Ordered collection of diagnostics with severity counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    ///
    /// Diagnostics reach the user through the report writers, so the log
    /// only traces them at debug level.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let location = diagnostic.location().unwrap_or_default();
        tracing::debug!(severity = %diagnostic.severity, %location, "{}", diagnostic.message);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
