//! Stock build configuration.
//!
//! Declares the target matrix the pipeline ships with: for each bundle
//! flavor, a modern target (native features, UMD + ESM outputs) and a legacy
//! target (downgraded, polyfilled, UMD only). Only the mini legacy target is
//! enabled; the rest are fully specified but disabled until the project
//! opts in through `[targets] enabled` in `Ballast.toml`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::core::catalog::{CapabilityCatalog, ShimSymbols};
use crate::core::config::BuildConfig;
use crate::core::externals::ExternalModules;
use crate::core::project::Project;
use crate::core::target::{BuildTarget, OutputSpec};
use crate::stage::{
    CapabilityRewrite, DynamicImportAnnotation, FileSubstitution, InheritancePatch, Stage,
    StagePipeline,
};
use crate::util::fs;

/// Bundle flavors, largest to smallest.
const FLAVORS: &[&str] = &["full", "lite", "mini", "core"];

/// Legacy flavors that ship by default.
const DEFAULT_ENABLED: &[&str] = &["mini-legacy"];

/// The stock capability catalog: native invocations unavailable on legacy
/// runtimes, and the shim symbols that replace them.
pub fn capability_catalog() -> Result<CapabilityCatalog> {
    CapabilityCatalog::new([
        ("Object.keys", "ObjectKeys"),
        ("Object.values", "ObjectValues"),
        ("Object.entries", "ObjectEntries"),
        ("Object.assign", "ObjectAssign"),
        ("Object.fromEntries", "ObjectFromEntries"),
        ("Array.from", "ArrayFrom"),
        ("new Set", "NewSet"),
        ("new Map", "NewMap"),
        ("Number.isNaN", "isNaN"),
    ])
    .context("stock capability catalog is inconsistent")
}

/// Assemble the full target matrix for a project.
pub fn default_targets(project: &Project, config: &BuildConfig) -> Result<Vec<BuildTarget>> {
    let externals = ExternalModules::from_manifest(project.manifest());
    let name = project.name().to_string();

    let shim_path = fs::normalize_path(&project.resolve(&config.legacy.shim));
    let catalog = Arc::new(capability_catalog()?);
    // The shim symbol set is derived once per build run from the shim
    // unit's exports. Legacy targets cannot be assembled without it.
    let shim_source = fs::read_to_string(&shim_path)
        .with_context(|| "legacy targets need the shim-definition unit".to_string())?;
    let symbols = Arc::new(ShimSymbols::from_source(&shim_source));
    if symbols.is_empty() {
        anyhow::bail!(
            "shim unit {} exports no symbols; nothing to import into rewritten units",
            shim_path.display()
        );
    }

    let mut targets = Vec::new();

    for flavor in FLAVORS {
        let entry = PathBuf::from(format!("src/bundle-{}.js", flavor));

        let modern_stages: Vec<Arc<dyn Stage>> = vec![Arc::new(DynamicImportAnnotation::new())];
        let modern = BuildTarget::new(format!("{}-modern", flavor), entry.clone())
            .with_output(OutputSpec::esm(
                config.dist_dir.join(format!("{}.esm.js", flavor)),
            ))
            .with_output(OutputSpec::umd(
                config.dist_dir.join(format!("{}.umd.js", flavor)),
                name.clone(),
            ))
            .with_externals(externals.clone())
            .with_stages(StagePipeline::new(modern_stages))
            .disabled();
        targets.push(maybe_minified(modern, config));

        let mut legacy_stages: Vec<Arc<dyn Stage>> = Vec::new();
        for stub in &config.legacy.stub_files {
            legacy_stages.push(Arc::new(FileSubstitution::new(stub.clone())));
        }
        // Module ids are canonicalized paths, so the marker must be too.
        legacy_stages.push(Arc::new(CapabilityRewrite::new(
            fs::normalize_path(project.root()).to_string_lossy().into_owned(),
            shim_path.clone(),
            catalog.clone(),
            symbols.clone(),
        )));
        legacy_stages.push(Arc::new(InheritancePatch::new()));

        let legacy = BuildTarget::new(format!("{}-legacy", flavor), entry)
            .with_output(OutputSpec::umd(
                config.dist_dir.join(format!("{}.legacy.umd.js", flavor)),
                name.clone(),
            ))
            .with_externals(externals.clone())
            .with_stages(StagePipeline::new(legacy_stages))
            .with_transpiler(config.tools.transpiler.clone())
            .disabled();
        targets.push(maybe_minified(legacy, config));
    }

    apply_enabled_set(&mut targets, config);
    Ok(targets)
}

fn maybe_minified(target: BuildTarget, config: &BuildConfig) -> BuildTarget {
    match &config.tools.minifier {
        Some(tool) => target.with_minifier(tool.clone()),
        None => target,
    }
}

/// Enable the configured target set (or the stock default).
fn apply_enabled_set(targets: &mut [BuildTarget], config: &BuildConfig) {
    let enabled: Vec<&str> = match &config.targets.enabled {
        Some(names) => names.iter().map(|s| s.as_str()).collect(),
        None => DEFAULT_ENABLED.to_vec(),
    };
    for target in targets.iter_mut() {
        target.enabled = enabled.contains(&target.name.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::Manifest;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn project_with_shim(tmp: &TempDir) -> Project {
        let shim_dir = tmp.path().join("src").join("util");
        stdfs::create_dir_all(&shim_dir).unwrap();
        stdfs::write(
            shim_dir.join("polyfill.js"),
            "export function ObjectKeys() {}\nexport function NewSet() {}\n",
        )
        .unwrap();
        let manifest = Manifest::parse(r#"{"name": "exifr"}"#).unwrap();
        Project::new(tmp.path(), manifest)
    }

    #[test]
    fn test_stock_catalog_is_valid() {
        let catalog = capability_catalog().unwrap();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.entries()[0].native, "Object.keys");
    }

    #[test]
    fn test_only_mini_legacy_enabled_by_default() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_shim(&tmp);
        let targets = default_targets(&project, &BuildConfig::default()).unwrap();

        // Four flavors, modern + legacy each.
        assert_eq!(targets.len(), 8);
        let enabled: Vec<&str> = targets
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(enabled, vec!["mini-legacy"]);
    }

    #[test]
    fn test_legacy_targets_validate() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_shim(&tmp);
        let targets = default_targets(&project, &BuildConfig::default()).unwrap();

        for target in &targets {
            target.validate().unwrap_or_else(|e| panic!("{}: {}", target.name, e));
        }
    }

    #[test]
    fn test_enabled_override() {
        let tmp = TempDir::new().unwrap();
        let project = project_with_shim(&tmp);
        let mut config = BuildConfig::default();
        config.targets.enabled = Some(vec!["full-modern".to_string(), "mini-legacy".to_string()]);

        let targets = default_targets(&project, &config).unwrap();
        let enabled: Vec<&str> = targets
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(enabled, vec!["full-modern", "mini-legacy"]);
    }

    #[test]
    fn test_missing_shim_unit_fails() {
        let tmp = TempDir::new().unwrap();
        let manifest = Manifest::parse(r#"{"name": "exifr"}"#).unwrap();
        let project = Project::new(tmp.path(), manifest);

        let err = default_targets(&project, &BuildConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("shim"));
    }
}
