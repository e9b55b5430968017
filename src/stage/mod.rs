//! Stage trait definition and pipeline assembly.
//!
//! A stage is one pass of the source-transformation pipeline. Each stage
//! implements only the hooks it declares in its capabilities; the driver
//! checks declared capabilities instead of probing methods. Hooks with a
//! safe fallback signal "no opinion" by returning `None`, which tells the
//! bundler to proceed as if the stage were absent.

pub mod dynimport;
pub mod inherit;
pub mod rewrite;
pub mod substitute;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::Diagnostic;

pub use dynimport::DynamicImportAnnotation;
pub use inherit::InheritancePatch;
pub use rewrite::CapabilityRewrite;
pub use substitute::FileSubstitution;

/// Hooks a stage participates in.
///
/// `resolve`, `load`, and `transform` run during module graph construction;
/// `render` runs once per emitted artifact after bundling and transpilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCapabilities {
    /// Intercepts specifier resolution.
    pub resolve: bool,

    /// Supplies content for resolved identifiers.
    pub load: bool,

    /// Rewrites per-unit content during graph traversal.
    pub transform: bool,

    /// Rewrites the fully-assembled artifact text.
    pub render: bool,

    /// The render hook only makes sense on transpiled output (it targets
    /// code the downgrading transpiler emits). Declaring this lets target
    /// assembly reject a misordered pipeline up front instead of failing at
    /// first marker mismatch.
    pub requires_transpiled: bool,
}

impl StageCapabilities {
    /// Whether the stage declares at least one hook.
    pub fn any(&self) -> bool {
        self.resolve || self.load || self.transform || self.render
    }
}

/// Context passed to render hooks.
///
/// Collects configuration-mismatch warnings (marker drift and the like) so
/// the driver can surface them with target and stage attribution without
/// aborting the build.
#[derive(Debug)]
pub struct RenderContext {
    /// Name of the target being rendered.
    pub target: String,

    /// Warnings raised during rendering.
    pub warnings: Vec<Diagnostic>,
}

impl RenderContext {
    /// Create a render context for a target.
    pub fn new(target: impl Into<String>) -> RenderContext {
        RenderContext {
            target: target.into(),
            warnings: Vec::new(),
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }
}

/// One pass of the source-transformation pipeline.
///
/// Default hook implementations return "no opinion"; a stage overrides only
/// the hooks named in its capabilities.
pub trait Stage: Send + Sync {
    /// Stage name, used in diagnostics and error context.
    fn name(&self) -> &'static str;

    /// Hooks this stage implements.
    fn capabilities(&self) -> StageCapabilities;

    /// Map a requested specifier to an alternate identifier.
    ///
    /// `None` means no opinion: the specifier falls through to normal
    /// resolution.
    fn resolve(&self, _specifier: &str, _importer: Option<&Path>) -> Option<String> {
        None
    }

    /// Supply content for an identifier this stage resolved.
    fn load(&self, _id: &str) -> Option<String> {
        None
    }

    /// Rewrite one source unit. `Ok(None)` means no opinion: the bundler
    /// keeps the unit's current content.
    fn transform(&self, _content: &str, _path: &Path) -> Result<Option<String>> {
        Ok(None)
    }

    /// Rewrite the fully-assembled artifact text.
    fn render(&self, content: String, _ctx: &mut RenderContext) -> Result<String> {
        Ok(content)
    }
}

/// Pipeline assembly errors. These are configuration mistakes, caught before
/// any file is touched.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PipelineError {
    /// A stage declaring no hooks can never run.
    #[error("stage `{stage}` declares no capabilities")]
    #[diagnostic(code(ballast::pipeline::no_capabilities))]
    NoCapabilities { stage: String },

    /// Stage names must be unique for error attribution.
    #[error("stage `{stage}` appears more than once in the pipeline")]
    #[diagnostic(code(ballast::pipeline::duplicate_stage))]
    DuplicateStage { stage: String },

    /// A transpile-dependent render stage on a target with no transpiler
    /// would always miss its marker.
    #[error("stage `{stage}` requires transpiled output, but target `{target}` has no transpiler")]
    #[diagnostic(
        code(ballast::pipeline::ordering_violation),
        help("Configure a transpiler under [tools] in Ballast.toml, or drop the stage from this target")
    )]
    OrderingViolation { stage: String, target: String },
}

/// Ordered list of stages for one build target.
///
/// Order is a correctness invariant: transform stages run per unit in listed
/// order, and render stages run on the artifact in listed order.
#[derive(Clone, Default)]
pub struct StagePipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl std::fmt::Debug for StagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

impl StagePipeline {
    /// Build a pipeline from stages in execution order.
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> StagePipeline {
        StagePipeline { stages }
    }

    /// All stages in order.
    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    /// Stages participating in specifier resolution.
    pub fn resolvers(&self) -> impl Iterator<Item = &Arc<dyn Stage>> {
        self.stages.iter().filter(|s| s.capabilities().resolve)
    }

    /// Stages participating in content loading.
    pub fn loaders(&self) -> impl Iterator<Item = &Arc<dyn Stage>> {
        self.stages.iter().filter(|s| s.capabilities().load)
    }

    /// Stages participating in per-unit transformation.
    pub fn transformers(&self) -> impl Iterator<Item = &Arc<dyn Stage>> {
        self.stages.iter().filter(|s| s.capabilities().transform)
    }

    /// Stages participating in artifact rendering.
    pub fn renderers(&self) -> impl Iterator<Item = &Arc<dyn Stage>> {
        self.stages.iter().filter(|s| s.capabilities().render)
    }

    /// Validate the pipeline for a target.
    ///
    /// `has_transpiler` states whether the target runs a downgrading
    /// transpiler before the render phase.
    pub fn validate(&self, target: &str, has_transpiler: bool) -> Result<(), PipelineError> {
        let mut seen: Vec<&str> = Vec::new();
        for stage in &self.stages {
            let caps = stage.capabilities();
            if !caps.any() {
                return Err(PipelineError::NoCapabilities {
                    stage: stage.name().to_string(),
                });
            }
            if seen.contains(&stage.name()) {
                return Err(PipelineError::DuplicateStage {
                    stage: stage.name().to_string(),
                });
            }
            seen.push(stage.name());

            if caps.requires_transpiled && !has_transpiler {
                return Err(PipelineError::OrderingViolation {
                    stage: stage.name().to_string(),
                    target: target.to_string(),
                });
            }
        }
        Ok(())
    }
}
