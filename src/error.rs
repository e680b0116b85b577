//! Error types for signature parsing and index building.

use std::path::PathBuf;

use crate::registry::ObjectKind;

/// Errors raised while parsing signatures or building the source index.
#[derive(Debug, thiserror::Error)]
pub enum SolidityError {
    /// A directive header does not match the shape expected for its kind.
    #[error("malformed {kind} signature {signature:?}: {reason}")]
    MalformedSignature {
        kind: ObjectKind,
        signature: String,
        reason: String,
    },

    /// A contract-like declaration was entered while another one was open.
    #[error("{file}:{line}: cannot enter {inner} while already in {outer}")]
    NestingViolation {
        file: String,
        line: usize,
        inner: String,
        outer: String,
    },

    /// The configured lookup path is missing or unreadable.
    #[error("lookup path {} is not accessible: {source}", path.display())]
    IndexInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The Solidity grammar could not be loaded into the parser.
    #[error("failed to load Solidity grammar: {0}")]
    Grammar(String),

    /// A configuration file could not be read or deserialized.
    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SolidityError {
    /// Shorthand for a [`SolidityError::MalformedSignature`].
    pub fn malformed(kind: ObjectKind, signature: &str, reason: impl Into<String>) -> Self {
        SolidityError::MalformedSignature {
            kind,
            signature: signature.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error only invalidates a single file of the index.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            SolidityError::NestingViolation { .. } | SolidityError::Io { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SolidityError>;
