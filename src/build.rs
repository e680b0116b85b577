//! Lifecycle of one documentation build.

use std::path::PathBuf;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::index::build_index;
use crate::registry::SourceRegistry;

/// Owns the registry and diagnostics of a documentation build.
///
/// The registry is filled from empty by [`BuildContext::init`] and by every
/// [`BuildContext::rebuild`]; nothing outlives the context.
#[derive(Debug)]
pub struct BuildContext {
    docs_root: PathBuf,
    config: Config,
    registry: SourceRegistry,
    diagnostics: Diagnostics,
}

impl BuildContext {
    /// Create a context and build the source index.
    pub fn init(docs_root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let mut context = Self {
            docs_root: docs_root.into(),
            config,
            registry: SourceRegistry::new(),
            diagnostics: Diagnostics::new(),
        };
        context.rebuild()?;
        Ok(context)
    }

    /// Discard the registry and index the sources again.
    pub fn rebuild(&mut self) -> Result<()> {
        self.registry.clear();
        self.diagnostics.clear();

        let root = self.lookup_root();
        tracing::info!(root = %root.display(), "building source index");
        if let Err(err) = build_index(&root, &self.config, &mut self.registry, &mut self.diagnostics) {
            self.registry.clear();
            return Err(err);
        }
        Ok(())
    }

    pub fn lookup_root(&self) -> PathBuf {
        self.config.resolve_lookup_path(&self.docs_root)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Diagnostics raised outside indexing, e.g. while documenting.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }
}

impl Drop for BuildContext {
    fn drop(&mut self) {
        tracing::debug!(records = self.registry.len(), "dropping source registry");
    }
}
