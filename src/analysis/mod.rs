//! Tree-sitter backed analysis of Solidity sources.
//!
//! ```text
//! ┌─────────────┐     ┌────────────────┐     ┌──────────────────┐
//! │ .sol source │────▶│ SolidityParser │────▶│ ParsedFile       │
//! └─────────────┘     └────────────────┘     └──────────────────┘
//!                                                     │
//!                                                     ▼
//!                     ┌────────────────┐     ┌──────────────────┐
//!                     │ FileDefinitions│◀────│ walker + comments│
//!                     │ (records,diags)│     │ + signature::tree│
//!                     └────────────────┘     └──────────────────┘
//! ```

mod comments;
mod parsed;
mod walker;

pub use comments::{documentation_for, extract_documentation, preceding_comments};
pub use parsed::{start_line, ParsedFile, SolidityParser};
pub use walker::{walk_source, DefinitionsRecorder, FileDefinitions};
