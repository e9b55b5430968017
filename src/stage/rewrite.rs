//! Capability-Rewrite Stage.
//!
//! Rewrites each library unit so native-capability invocations go through
//! shim functions instead, then prepends an import pulling the shim symbols
//! from the shim-definition unit via a path computed relative to the unit.
//!
//! Matching is exact whole-text substring replacement in catalog order. It is
//! not scope-aware: a pattern also matches inside unrelated identifiers,
//! string literals, and comments that happen to contain the same characters.
//! That precision/recall tradeoff is part of the stage's contract; output
//! compatibility depends on it. Swapping in a syntax-aware rewrite means
//! replacing this stage behind the same trait, not "fixing" it in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::core::catalog::{CapabilityCatalog, ShimSymbols};
use crate::util::fs;

use super::{Stage, StageCapabilities};

/// Rewrites native-capability usages in library units to shim symbols.
#[derive(Debug, Clone)]
pub struct CapabilityRewrite {
    library_marker: String,
    shim_path: PathBuf,
    catalog: Arc<CapabilityCatalog>,
    symbols: Arc<ShimSymbols>,
}

impl CapabilityRewrite {
    /// Create the stage.
    ///
    /// `library_marker` is the path fragment identifying units that belong
    /// to the library being built (typically the project root path); units
    /// whose path does not contain it are left alone, including synthetic
    /// substitution stubs. `shim_path` is the absolute path of the
    /// shim-definition unit.
    pub fn new(
        library_marker: impl Into<String>,
        shim_path: impl Into<PathBuf>,
        catalog: Arc<CapabilityCatalog>,
        symbols: Arc<ShimSymbols>,
    ) -> CapabilityRewrite {
        CapabilityRewrite {
            library_marker: library_marker.into(),
            shim_path: shim_path.into(),
            catalog,
            symbols,
        }
    }

    /// Compute the import path from a consuming unit to the shim unit:
    /// relative to the unit's directory, forward slashes, explicitly
    /// relative.
    fn import_path_from(&self, unit: &Path) -> String {
        let base = unit.parent().unwrap_or_else(|| Path::new(""));
        let relative = fs::relative_path(base, &self.shim_path);
        let mut rendered = fs::forward_slashes(&relative);
        if !rendered.starts_with('.') {
            rendered = format!("./{}", rendered);
        }
        rendered
    }
}

impl Stage for CapabilityRewrite {
    fn name(&self) -> &'static str {
        "rewrite-capabilities"
    }

    fn capabilities(&self) -> StageCapabilities {
        StageCapabilities {
            transform: true,
            ..Default::default()
        }
    }

    fn transform(&self, content: &str, path: &Path) -> Result<Option<String>> {
        if !path.to_string_lossy().contains(&self.library_marker) {
            return Ok(None);
        }
        // The shim unit defines the symbols; rewriting it would turn the
        // definitions into self-references.
        if path.file_name() == self.shim_path.file_name() {
            return Ok(None);
        }

        let mut code = content.to_string();
        for entry in self.catalog.entries() {
            code = code.replace(&entry.native, &entry.shim);
        }

        let import_line = self.symbols.import_line(&self.import_path_from(path));
        Ok(Some(format!("{}\n{}", import_line, code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage() -> CapabilityRewrite {
        let catalog = CapabilityCatalog::new([
            ("Object.keys", "ObjectKeys"),
            ("new Set", "NewSet"),
        ])
        .unwrap();
        let symbols =
            ShimSymbols::from_source("export function ObjectKeys() {}\nexport function NewSet() {}\n");
        CapabilityRewrite::new(
            "exifr",
            "/work/exifr/src/util/polyfill.js",
            Arc::new(catalog),
            Arc::new(symbols),
        )
    }

    #[test]
    fn test_rewrites_and_prepends_import() {
        let stage = stage();
        let out = stage
            .transform("let k = Object.keys(x)", Path::new("/work/exifr/src/core.js"))
            .unwrap()
            .unwrap();

        let expected = "import {ObjectKeys, NewSet} from './util/polyfill.js'\n\nlet k = ObjectKeys(x)";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_import_path_walks_up_directories() {
        let stage = stage();
        let out = stage
            .transform("new Set()", Path::new("/work/exifr/src/a/b/c/foo.js"))
            .unwrap()
            .unwrap();

        assert!(out.starts_with(
            "import {ObjectKeys, NewSet} from '../../../util/polyfill.js'\n\n"
        ));
        assert!(out.ends_with("NewSet()"));
    }

    #[test]
    fn test_no_opinion_outside_library() {
        let stage = stage();
        let out = stage
            .transform("Object.keys(x)", Path::new("/work/other/src/core.js"))
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_shim_unit_never_rewritten() {
        let stage = stage();
        // The shim unit trivially contains every shim symbol name.
        let out = stage
            .transform(
                "export function ObjectKeys() { return Object.keys }",
                Path::new("/work/exifr/src/util/polyfill.js"),
            )
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let stage = stage();
        let out = stage
            .transform(
                "Object.keys(a); Object.keys(b); new Set(c)",
                Path::new("/work/exifr/src/core.js"),
            )
            .unwrap()
            .unwrap();
        assert!(out.contains("ObjectKeys(a); ObjectKeys(b); NewSet(c)"));
        assert!(!out.contains("Object.keys"));
    }

    #[test]
    fn test_overmatch_inside_strings_is_by_contract() {
        // Whole-text matching hits string literals too. The behavior is
        // pinned here so a change to it is a conscious decision.
        let stage = stage();
        let out = stage
            .transform(
                "log('calling Object.keys now')",
                Path::new("/work/exifr/src/core.js"),
            )
            .unwrap()
            .unwrap();
        assert!(out.contains("log('calling ObjectKeys now')"));
    }
}
