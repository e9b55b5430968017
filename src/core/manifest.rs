//! `package.json` manifest parsing.
//!
//! The manifest supplies the package name (used for the exposed global and
//! the AMD loader id) and the runtime dependency names that feed the
//! external-module set. Everything else in the file is ignored.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::util::fs;

/// Manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// The parsed package manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Package name, used as the exposed global/export name.
    pub name: String,

    /// Package version (informational).
    #[serde(default)]
    pub version: Option<String>,

    /// Runtime dependencies: name -> version requirement.
    ///
    /// These are never inlined into a bundle; they stay external and are
    /// resolved by the consuming environment.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

impl Manifest {
    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> Result<Manifest> {
        let content = fs::read_to_string(path)?;
        Manifest::parse(&content)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse manifest content.
    pub fn parse(content: &str) -> Result<Manifest> {
        let manifest: Manifest = serde_json::from_str(content)?;
        if manifest.name.is_empty() {
            anyhow::bail!("manifest `name` must not be empty");
        }
        Ok(manifest)
    }

    /// Names of all declared runtime dependencies.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let manifest = Manifest::parse(r#"{"name": "exifr"}"#).unwrap();
        assert_eq!(manifest.name, "exifr");
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn test_parse_with_dependencies() {
        let manifest = Manifest::parse(
            r#"{
                "name": "mylib",
                "version": "5.0.0",
                "dependencies": {"zlib-js": "^1.0", "buffer-shim": "2.1.0"},
                "devDependencies": {"rollup": "^2.0"}
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.version.as_deref(), Some("5.0.0"));
        let deps: Vec<_> = manifest.dependency_names().collect();
        assert_eq!(deps, vec!["buffer-shim", "zlib-js"]);
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        assert!(Manifest::parse(r#"{"name": ""}"#).is_err());
    }
}
