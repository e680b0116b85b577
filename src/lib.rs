//! Soldoc - Solidity source indexer for API documentation.
//!
//! Soldoc walks a tree of Solidity sources, records every contract,
//! library, interface and member declaration with a canonical signature
//! and its NatSpec comment, and renders reStructuredText directives from
//! the resulting registry.
//!
//! # Architecture
//!
//! - `signature`: structured signatures, from directive headers or syntax trees
//! - `analysis`: tree-sitter parsing, doc comments and the declaration walker
//! - `registry`: the indexed, append-only store of declaration records
//! - `index` / `build`: source discovery and the build lifecycle
//! - `documenter`: target resolution and reStructuredText generation
//! - `config`, `diagnostics`, `report`: settings, build messages and output

pub mod analysis;
pub mod build;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod documenter;
pub mod error;
pub mod index;
pub mod registry;
pub mod report;
pub mod signature;

pub use analysis::{walk_source, ParsedFile, SolidityParser};
pub use build::BuildContext;
pub use config::{Config, FileErrorPolicy};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use documenter::{AutoDocumenter, Documenter, DocumenterOptions, MemberSelection, Target};
pub use error::{Result, SolidityError};
pub use index::build_index;
pub use registry::{DeclarationRecord, ObjectKind, RecordQuery, SourceRegistry};
pub use signature::{format_signature, parse_directive, Signature};
