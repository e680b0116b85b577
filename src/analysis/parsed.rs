//! Parsing Solidity sources with tree-sitter.

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::{Result, SolidityError};

/// A parsed tree together with the source it was built from.
pub struct ParsedFile {
    pub tree: Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// Path relative to the lookup root.
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Whether tree-sitter had to recover from syntax errors anywhere.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// 1-indexed line a node starts on.
pub fn start_line(node: Node) -> usize {
    node.start_position().row + 1 // tree-sitter is 0-indexed
}

/// Owns the Solidity grammar and hands out parsed files.
///
/// `tree_sitter::Parser` is not `Sync`, so a fresh parser is created for
/// every file; the language handle itself is cheap to clone.
pub struct SolidityParser {
    language: Language,
}

impl SolidityParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_solidity::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| SolidityError::Grammar(e.to_string()))?;
        Ok(parser)
    }

    /// Parse `source` into a tree. Syntax errors do not fail the parse;
    /// they show up as ERROR nodes in the returned tree.
    pub fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SolidityError::Grammar(format!("parser produced no tree for {}", path)))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string(),
        })
    }
}

impl Default for SolidityParser {
    fn default() -> Self {
        Self::new()
    }
}
