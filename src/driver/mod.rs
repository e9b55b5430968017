//! Bundle assembly driver.
//!
//! Runs one build target end to end, in fixed order: validate the pipeline,
//! check tool availability, bundle (resolve/load/transform hooks run inside
//! the bundler), transpile, then per output emit the format wrapper, run the
//! render stages, minify, and write. Later phases depend on text the earlier
//! phases produced, so the order is a correctness invariant; a failure in
//! any phase aborts the target with target/stage/unit context attached.

pub mod bundler;
pub mod presets;
pub mod toolchain;

use std::path::PathBuf;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::core::project::Project;
use crate::core::target::BuildTarget;
use crate::stage::RenderContext;
use crate::util::{fs, Diagnostic};

pub use bundler::{Bundle, BundledModule, Bundler, LinkerBundler};
pub use toolchain::{ExternalTool, ToolAvailability};

/// One written artifact.
#[derive(Debug, Clone)]
pub struct ArtifactReport {
    /// Output path.
    pub path: PathBuf,

    /// Size in bytes.
    pub bytes: usize,

    /// SHA-256 digest of the written content.
    pub digest: String,
}

/// Result of building one target.
#[derive(Debug)]
pub struct TargetOutcome {
    /// Target name.
    pub target: String,

    /// Written artifacts, one per output descriptor.
    pub artifacts: Vec<ArtifactReport>,

    /// Non-fatal warnings raised by render stages.
    pub warnings: Vec<Diagnostic>,
}

/// Build one target and write its artifacts.
pub fn build_target(
    project: &Project,
    target: &BuildTarget,
    bundler: &dyn Bundler,
) -> Result<TargetOutcome> {
    // Configuration errors surface before any file is read.
    target
        .validate()
        .with_context(|| format!("target `{}` has an invalid pipeline", target.name))?;

    let transpiler = target
        .transpiler
        .clone()
        .map(|spec| ExternalTool::new("transpiler", spec));
    let minifier = target
        .minifier
        .clone()
        .map(|spec| ExternalTool::new("minifier", spec));
    for tool in transpiler.iter().chain(minifier.iter()) {
        tool.require()
            .with_context(|| format!("target `{}`", target.name))?;
    }

    tracing::debug!("bundling {} from {}", target.name, target.entry.display());
    let bundle = bundler
        .bundle(project, target)
        .with_context(|| format!("target `{}`: bundling failed", target.name))?;
    tracing::debug!(
        "{}: {} modules, {} externals",
        target.name,
        bundle.modules.len(),
        bundle.externals.len()
    );

    let mut body = bundle.body();
    if let Some(ref tool) = transpiler {
        body = tool
            .filter(&body)
            .with_context(|| format!("target `{}`: transpilation failed", target.name))?;
    }

    let mut ctx = RenderContext::new(&target.name);
    let mut artifacts = Vec::new();

    for spec in &target.outputs {
        let mut code = bundle.emit(&body, spec);

        for stage in target.stages.renderers() {
            code = stage.render(code, &mut ctx).with_context(|| {
                format!(
                    "target `{}`, stage `{}` failed on {}",
                    target.name,
                    stage.name(),
                    spec.path.display()
                )
            })?;
        }

        if let Some(ref tool) = minifier {
            code = tool.filter(&code).with_context(|| {
                format!(
                    "target `{}`: minification failed for {}",
                    target.name,
                    spec.path.display()
                )
            })?;
        }

        let out_path = project.resolve(&spec.path);
        fs::write_string(&out_path, &code)
            .with_context(|| format!("target `{}`", target.name))?;

        let digest = hex::encode(Sha256::digest(code.as_bytes()));
        tracing::info!(
            "wrote {} ({} bytes, {} format)",
            out_path.display(),
            code.len(),
            spec.format.as_str()
        );
        artifacts.push(ArtifactReport {
            path: out_path,
            bytes: code.len(),
            digest,
        });
    }

    Ok(TargetOutcome {
        target: target.name.clone(),
        artifacts,
        warnings: ctx.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ToolSpec;
    use crate::core::manifest::Manifest;
    use crate::core::target::OutputSpec;
    use crate::stage::{InheritancePatch, Stage, StagePipeline};
    use std::fs as stdfs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn project_in(tmp: &TempDir) -> Project {
        let manifest = Manifest::parse(r#"{"name": "mylib"}"#).unwrap();
        Project::new(tmp.path(), manifest)
    }

    #[test]
    fn test_build_target_writes_artifact() {
        let tmp = TempDir::new().unwrap();
        stdfs::create_dir_all(tmp.path().join("src")).unwrap();
        stdfs::write(tmp.path().join("src/entry.js"), "export var parse = 1\n").unwrap();

        let target = BuildTarget::new("plain", "src/entry.js")
            .with_output(OutputSpec::umd("dist/plain.umd.js", "mylib"));
        let project = project_in(&tmp);

        let outcome = build_target(&project, &target, &LinkerBundler::new()).unwrap();
        assert_eq!(outcome.artifacts.len(), 1);
        let report = &outcome.artifacts[0];
        assert_eq!(report.digest.len(), 64);

        let written = stdfs::read_to_string(&report.path).unwrap();
        assert!(written.contains("exports.parse = parse;"));
        assert_eq!(report.bytes, written.len());
    }

    #[test]
    fn test_invalid_pipeline_rejected_before_io() {
        let tmp = TempDir::new().unwrap();
        // No entry file on disk: validation must fail first.
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(InheritancePatch::new())];
        let target = BuildTarget::new("broken", "src/missing.js")
            .with_stages(StagePipeline::new(stages))
            .with_output(OutputSpec::umd("dist/broken.umd.js", "mylib"));

        let err = build_target(&project_in(&tmp), &target, &LinkerBundler::new()).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid pipeline"));
    }

    #[test]
    #[cfg(unix)]
    fn test_marker_miss_surfaces_warning() {
        let tmp = TempDir::new().unwrap();
        stdfs::create_dir_all(tmp.path().join("src")).unwrap();
        stdfs::write(tmp.path().join("src/entry.js"), "export var parse = 1\n").unwrap();

        // `cat` stands in for a transpiler that never emits the helper.
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(InheritancePatch::new())];
        let target = BuildTarget::new("warned", "src/entry.js")
            .with_stages(StagePipeline::new(stages))
            .with_transpiler(ToolSpec::new("cat", Vec::<String>::new()))
            .with_output(OutputSpec::umd("dist/warned.umd.js", "mylib"));

        let outcome = build_target(&project_in(&tmp), &target, &LinkerBundler::new()).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].format(false).contains("marker not found"));
    }

    #[test]
    fn test_missing_tool_aborts_target() {
        let tmp = TempDir::new().unwrap();
        let target = BuildTarget::new("no-tool", "src/entry.js")
            .with_transpiler(ToolSpec::new("ballast-no-such-tool", Vec::<String>::new()))
            .with_output(OutputSpec::umd("dist/x.umd.js", "mylib"));

        let err = build_target(&project_in(&tmp), &target, &LinkerBundler::new()).unwrap_err();
        assert!(format!("{:#}", err).contains("not found on PATH"));
    }
}
