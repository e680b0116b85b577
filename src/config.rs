//! Build configuration.
//!
//! Loaded from `soldoc.yaml` (or `.soldoc.yaml`) next to the documentation
//! sources. Every field is optional:
//!
//! ```yaml
//! lookup_path: ../contracts
//! excluded_paths:
//!   - "**/mocks/**"
//! include_hidden: false
//! on_file_error: continue
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolidityError};

/// Configuration file names looked up in the documentation root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["soldoc.yaml", ".soldoc.yaml"];

/// What a build does when a single source file cannot be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileErrorPolicy {
    /// Drop the file's records, emit an error diagnostic and go on.
    #[default]
    Continue,
    /// Fail the whole build on the first broken file.
    Abort,
}

/// Settings for one documentation build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the Solidity sources, relative to the documentation root.
    #[serde(default = "default_lookup_path")]
    pub lookup_path: PathBuf,
    /// Glob patterns (relative to the lookup path) of files to skip.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Whether to descend into directories whose name starts with `.`.
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    pub on_file_error: FileErrorPolicy,
}

fn default_lookup_path() -> PathBuf {
    PathBuf::from("../contracts")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup_path: default_lookup_path(),
            excluded_paths: Vec::new(),
            include_hidden: false,
            on_file_error: FileErrorPolicy::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SolidityError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        // An empty file is a valid "all defaults" configuration.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&content).map_err(|e| SolidityError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Find and parse the first configuration file in `dir`.
    pub fn discover(dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                let config = Self::parse_file(&candidate)?;
                return Ok(Some((candidate, config)));
            }
        }
        Ok(None)
    }

    /// Lookup path resolved against the documentation root.
    pub fn resolve_lookup_path(&self, docs_root: &Path) -> PathBuf {
        if self.lookup_path.is_absolute() {
            self.lookup_path.clone()
        } else {
            docs_root.join(&self.lookup_path)
        }
    }

    /// Compile `excluded_paths` into a matcher.
    pub fn exclusion_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| SolidityError::Config {
                path: PathBuf::from("excluded_paths"),
                message: format!("invalid pattern {:?}: {}", pattern, e),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| SolidityError::Config {
            path: PathBuf::from("excluded_paths"),
            message: e.to_string(),
        })
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for pattern in &self.excluded_paths {
            Glob::new(pattern).map_err(|e| SolidityError::Config {
                path: path.to_path_buf(),
                message: format!("invalid excluded_paths pattern {:?}: {}", pattern, e),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.lookup_path, PathBuf::from("../contracts"));
        assert_eq!(config.on_file_error, FileErrorPolicy::Continue);
        assert!(!config.include_hidden);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
lookup_path: src
excluded_paths:
  - "**/mocks/**"
on_file_error: abort
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.lookup_path, PathBuf::from("src"));
        assert_eq!(config.excluded_paths, vec!["**/mocks/**"]);
        assert_eq!(config.on_file_error, FileErrorPolicy::Abort);
        assert!(!config.include_hidden);
    }

    #[test]
    fn test_discover_and_resolve() {
        let dir = TempDir::new().unwrap();
        assert!(Config::discover(dir.path()).unwrap().is_none());

        fs::write(dir.path().join(".soldoc.yaml"), "lookup_path: ../sol\n").unwrap();
        let (path, config) = Config::discover(dir.path()).unwrap().unwrap();
        assert!(path.ends_with(".soldoc.yaml"));
        assert_eq!(
            config.resolve_lookup_path(Path::new("/docs")),
            PathBuf::from("/docs/../sol")
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("soldoc.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(Config::parse_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("soldoc.yaml");

        fs::write(&path, "on_file_error: explode\n").unwrap();
        assert!(matches!(
            Config::parse_file(&path),
            Err(SolidityError::Config { .. })
        ));

        fs::write(&path, "excluded_paths: [\"a/{b\"]\n").unwrap();
        assert!(matches!(
            Config::parse_file(&path),
            Err(SolidityError::Config { .. })
        ));
    }

    #[test]
    fn test_exclusion_set() {
        let config = Config {
            excluded_paths: vec!["**/mocks/**".to_string(), "test/*.sol".to_string()],
            ..Config::default()
        };
        let set = config.exclusion_set().unwrap();
        assert!(set.is_match("src/mocks/Fake.sol"));
        assert!(set.is_match("test/A.sol"));
        assert!(!set.is_match("src/Token.sol"));
    }
}
