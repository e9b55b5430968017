//! Project discovery.
//!
//! A project is the directory holding the library's `package.json`.
//! Discovery walks up from the starting directory so ballast can be invoked
//! from anywhere inside the tree.

use std::path::{Path, PathBuf};

use anyhow::Result;
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::manifest::{Manifest, MANIFEST_FILE};

/// Raised when no `package.json` is found walking up from the start directory.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("could not find `{MANIFEST_FILE}` in `{start}` or any parent directory")]
#[diagnostic(
    code(ballast::project::manifest_not_found),
    help("Run ballast from inside the library, or pass the project directory with `-C`")
)]
pub struct ManifestNotFound {
    /// Directory the search started from.
    pub start: PathBuf,
}

/// A discovered project: root directory plus parsed manifest.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    manifest: Manifest,
}

impl Project {
    /// Discover the project containing `start` and load its manifest.
    pub fn discover(start: &Path) -> Result<Project> {
        let manifest_path = find_manifest(start)?;
        let manifest = Manifest::load(&manifest_path)?;
        Ok(Project {
            // find_manifest returns a path with at least one component.
            root: manifest_path.parent().unwrap_or(start).to_path_buf(),
            manifest,
        })
    }

    /// Create a project from an explicit root and manifest (test helper and
    /// programmatic entry point).
    pub fn new(root: impl Into<PathBuf>, manifest: Manifest) -> Project {
        Project {
            root: root.into(),
            manifest,
        }
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The parsed package manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Package name from the manifest.
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// Resolve a project-relative path against the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Walk up from `start` looking for the manifest file.
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        current = dir.parent();
    }
    Err(ManifestNotFound {
        start: start.to_path_buf(),
    }
    .into())
}
