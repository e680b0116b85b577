//! Depth-first walk of one parsed file that records its declarations.

use tree_sitter::Node;

use super::{comments, start_line, ParsedFile};
use crate::diagnostics::Diagnostic;
use crate::error::{Result, SolidityError};
use crate::registry::{DeclarationRecord, ObjectKind};
use crate::signature::tree;

/// Everything one file contributes to the registry.
#[derive(Debug, Default)]
pub struct FileDefinitions {
    pub records: Vec<DeclarationRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
struct OpenContract {
    name: String,
}

/// Listener state for a single file walk.
///
/// At most one contract-like scope is open at a time; members are stamped
/// with the open scope as their enclosing contract.
#[derive(Debug)]
pub struct DefinitionsRecorder {
    source_file: String,
    current_contract: Option<OpenContract>,
    output: FileDefinitions,
}

impl DefinitionsRecorder {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            current_contract: None,
            output: FileDefinitions::default(),
        }
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    pub fn current_contract(&self) -> Option<&str> {
        self.current_contract.as_ref().map(|c| c.name.as_str())
    }

    /// Record a contract-like declaration and open its scope.
    pub fn enter_contract(&mut self, record: DeclarationRecord) -> Result<()> {
        let name = record.name.clone().unwrap_or_default();
        self.check_not_nested(record.line, &name)?;

        tracing::debug!(file = %self.source_file, kind = %record.kind, "{}", record.signature);
        self.output.records.push(record);
        self.current_contract = Some(OpenContract { name });
        Ok(())
    }

    /// Fail with a nesting violation if a contract-like scope is open.
    pub fn check_not_nested(&self, line: usize, inner: &str) -> Result<()> {
        match &self.current_contract {
            Some(outer) => Err(SolidityError::NestingViolation {
                file: self.source_file.clone(),
                line,
                inner: inner.to_string(),
                outer: outer.name.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn exit_contract(&mut self) {
        self.current_contract = None;
    }

    /// Record a member declaration inside the open scope.
    ///
    /// File-level members are legal in newer Solidity but have no contract
    /// to document them under; they produce a warning instead of a record.
    pub fn record_member(&mut self, mut record: DeclarationRecord) {
        match &self.current_contract {
            Some(contract) => {
                record.enclosing_contract = Some(contract.name.clone());
                tracing::debug!(file = %self.source_file, kind = %record.kind, "{}", record.signature);
                self.output.records.push(record);
            }
            None => {
                self.warn(
                    record.line,
                    format!(
                        "{} `{}` is declared outside a contract and is not documented",
                        record.kind.label(),
                        record.signature
                    ),
                );
            }
        }
    }

    pub fn warn(&mut self, line: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(message).at(&self.source_file, line);
        self.output.diagnostics.push(diagnostic);
    }

    pub fn finish(self) -> FileDefinitions {
        self.output
    }
}

/// Walk a parsed file and collect its declarations.
///
/// A nesting violation aborts the walk; the caller must discard anything
/// the file produced.
pub fn walk_source(parsed: &ParsedFile) -> Result<FileDefinitions> {
    let mut recorder = DefinitionsRecorder::new(parsed.path.clone());
    visit(parsed, parsed.tree.root_node(), &mut recorder)?;
    Ok(recorder.finish())
}

/// Words that open a contract-like scope.
const SCOPE_KEYWORDS: &[&str] = &["contract", "library", "interface"];

/// Name declared by a contract-like header at the start of `text`.
///
/// The grammar has no rule for a contract inside a contract body, so such a
/// header only shows up as recovered text: an ERROR node, or a state
/// variable whose "type" is the keyword (`contract B` from `contract B {`).
fn scope_header_name(text: &str) -> Option<String> {
    let mut words = text
        .split(|c: char| c.is_whitespace() || c == '{')
        .filter(|w| !w.is_empty());
    let mut keyword = words.next()?;
    if keyword == "abstract" {
        keyword = words.next()?;
    }
    if !SCOPE_KEYWORDS.contains(&keyword) {
        return None;
    }
    let name: String = words
        .next()
        .unwrap_or_default()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    Some(name)
}

fn visit(parsed: &ParsedFile, node: Node, recorder: &mut DefinitionsRecorder) -> Result<()> {
    let kind = tree::object_kind(node);

    if recorder.current_contract().is_some()
        && (node.is_error() || kind == Some(ObjectKind::StateVar))
    {
        if let Some(inner) = scope_header_name(parsed.node_text(node)) {
            recorder.check_not_nested(start_line(node), &inner)?;
        }
    }

    let Some(kind) = kind else {
        // Plain structure or ERROR recovery: keep looking below.
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            visit(parsed, child, recorder)?;
        }
        return Ok(());
    };

    let line = start_line(node);
    let Some(record) = build_record(parsed, node, kind, recorder.source_file()) else {
        recorder.warn(line, format!("could not read {} declaration", kind.label()));
        return Ok(());
    };

    if kind.is_contract_like() {
        recorder.enter_contract(record)?;
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            visit(parsed, child, recorder)?;
        }
        recorder.exit_contract();
    } else {
        recorder.record_member(record);
    }
    Ok(())
}

fn build_record(
    parsed: &ParsedFile,
    node: Node,
    kind: ObjectKind,
    source_file: &str,
) -> Option<DeclarationRecord> {
    let parts = tree::signature(parsed, node, kind)?;
    let line = start_line(node);

    Some(
        DeclarationRecord::new(kind, source_file, parts, line)
            .with_documentation(comments::documentation_for(parsed, node))
            .with_members(tree::members(parsed, node, kind)),
    )
}
