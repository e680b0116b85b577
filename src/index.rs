//! Source index builder: discovers `.sol` files and fills a registry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::analysis::{walk_source, FileDefinitions, SolidityParser};
use crate::config::{Config, FileErrorPolicy};
use crate::diagnostics::{Diagnostic, Diagnostics, Severity};
use crate::error::{Result, SolidityError};
use crate::registry::SourceRegistry;

/// Solidity source extension, compared case-insensitively.
pub const SOURCE_EXTENSION: &str = "sol";

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the lookup root, posix separators.
    pub relative: String,
    pub absolute: PathBuf,
}

/// Relative path of `path` under `root`, posix style without a leading `./`.
pub fn relative_source_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    let mut rel = joined.as_str();
    while let Some(stripped) = rel.strip_prefix("./") {
        rel = stripped;
    }
    rel.to_string()
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}

fn inaccessible(root: &Path, source: io::Error) -> SolidityError {
    SolidityError::IndexInaccessible {
        path: root.to_path_buf(),
        source,
    }
}

/// Enumerate source files under `root` in lexicographic order of their
/// relative paths. Unreadable subdirectories become warnings.
pub fn discover_sources(
    root: &Path,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SourceFile>> {
    let metadata = fs::metadata(root).map_err(|e| inaccessible(root, e))?;
    if !metadata.is_dir() {
        return Err(inaccessible(
            root,
            io::Error::new(io::ErrorKind::Other, "not a directory"),
        ));
    }
    fs::read_dir(root).map_err(|e| inaccessible(root, e))?;

    let excluded = config.exclusion_set()?;
    let include_hidden = config.include_hidden;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden directories below the root
            let hidden = e.depth() > 0
                && e.file_type().is_dir()
                && e.file_name().to_string_lossy().starts_with('.');
            include_hidden || !hidden
        })
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let at = err
                    .path()
                    .map(|p| relative_source_path(root, p))
                    .unwrap_or_default();
                diagnostics.push(Diagnostic::warning(format!("cannot read {}: {}", at, err)));
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
            continue;
        }

        let relative = relative_source_path(root, entry.path());
        if excluded.is_match(&relative) {
            tracing::debug!(file = %relative, "excluded");
            continue;
        }

        files.push(SourceFile {
            relative,
            absolute: entry.path().to_path_buf(),
        });
    }

    // Directory-wise sorting differs from path order once separators are involved.
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

fn index_file(parser: &SolidityParser, file: &SourceFile) -> Result<(FileDefinitions, bool)> {
    let source = fs::read(&file.absolute).map_err(|source| SolidityError::Io {
        path: file.absolute.clone(),
        source,
    })?;
    let parsed = parser.parse(&file.relative, &source)?;
    let recovered = parsed.has_errors();
    Ok((walk_source(&parsed)?, recovered))
}

/// Decide whether a failure to index one file stops the build.
///
/// Only file-scoped errors are subject to `policy`; anything else is fatal.
fn apply_file_policy(
    policy: FileErrorPolicy,
    file: &str,
    err: SolidityError,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    if !err.is_file_scoped() {
        return Err(err);
    }
    match policy {
        FileErrorPolicy::Continue => {
            diagnostics.push(Diagnostic::from_file_error(file, &err));
            Ok(())
        }
        FileErrorPolicy::Abort => Err(err),
    }
}

/// Walk every source file under `root` into `registry`.
///
/// File-level failures follow `config.on_file_error`. A missing or
/// unreadable root fails the build.
pub fn build_index(
    root: &Path,
    config: &Config,
    registry: &mut SourceRegistry,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let files = discover_sources(root, config, diagnostics)?;
    let parser = SolidityParser::new();

    for file in &files {
        tracing::info!(file = %file.relative, "parsing");

        let (definitions, recovered) = match index_file(&parser, file) {
            Ok(result) => result,
            Err(err) => {
                apply_file_policy(config.on_file_error, &file.relative, err, diagnostics)?;
                continue;
            }
        };

        if recovered {
            diagnostics.push(
                Diagnostic::new(
                    Severity::Info,
                    "syntax errors in file; only recovered declarations are indexed",
                )
                .at(&file.relative, 0),
            );
        }

        diagnostics.extend(definitions.diagnostics);
        for record in definitions.records {
            let kind = record.kind;
            let target = record.target_id();
            let location = record.location();
            let inserted = registry.insert(record);

            if let Some(first) = inserted.duplicate_of.and_then(|id| registry.get(id)) {
                let first_location = first.location();
                let line = registry.get(inserted.id).map(|r| r.line).unwrap_or(0);
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "duplicate {} `{}` at {} (first declared at {})",
                        kind.label(),
                        target,
                        location,
                        first_location
                    ))
                    .at(&file.relative, line),
                );
            }
        }
    }

    tracing::info!(
        files = files.len(),
        records = registry.len(),
        "source index built"
    );
    Ok(())
}
