//! Build target descriptors - what gets bundled.
//!
//! A target ties together one entry unit, the stage pipeline applied while
//! bundling it, the external-module set, the tools that post-process the
//! artifact, and one or more output descriptors. Targets are independent and
//! side-effect-free with respect to each other.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::config::ToolSpec;
use crate::core::externals::ExternalModules;
use crate::stage::{PipelineError, StagePipeline};

/// Module format of an emitted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Universal loader: global variable, AMD, and CommonJS in one file.
    Umd,

    /// Native module syntax.
    Esm,
}

impl OutputFormat {
    /// Short name for logs and target listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Umd => "umd",
            OutputFormat::Esm => "esm",
        }
    }
}

/// One output artifact of a target.
#[derive(Debug, Clone, Serialize)]
pub struct OutputSpec {
    /// Output path, relative to the project root.
    pub path: PathBuf,

    /// Module format.
    pub format: OutputFormat,

    /// Global/export name exposed by the artifact (UMD only).
    pub global_name: Option<String>,

    /// Module-loader id registered with AMD loaders (UMD only).
    pub amd_id: Option<String>,
}

impl OutputSpec {
    /// A UMD output exposing `name` as both the global and the AMD id.
    pub fn umd(path: impl Into<PathBuf>, name: impl Into<String>) -> OutputSpec {
        let name = name.into();
        OutputSpec {
            path: path.into(),
            format: OutputFormat::Umd,
            amd_id: Some(name.clone()),
            global_name: Some(name),
        }
    }

    /// A native-module output.
    pub fn esm(path: impl Into<PathBuf>) -> OutputSpec {
        OutputSpec {
            path: path.into(),
            format: OutputFormat::Esm,
            global_name: None,
            amd_id: None,
        }
    }
}

/// A build target: entry, pipeline, externals, tools, outputs.
#[derive(Debug, Clone)]
pub struct BuildTarget {
    /// Target name, used for selection and diagnostics.
    pub name: String,

    /// Entry source unit, relative to the project root.
    pub entry: PathBuf,

    /// Output descriptors; one input may emit several formats.
    pub outputs: Vec<OutputSpec>,

    /// Modules left external to the bundle.
    pub externals: ExternalModules,

    /// Ordered stage pipeline.
    pub stages: StagePipeline,

    /// Downgrading transpiler, run on the assembled artifact before render
    /// stages. `None` means the target ships untranspiled output.
    pub transpiler: Option<ToolSpec>,

    /// Minifier, run last. `None` skips compression.
    pub minifier: Option<ToolSpec>,

    /// Disabled targets are fully specified but skipped by default builds.
    pub enabled: bool,
}

impl BuildTarget {
    /// Create a target with an empty pipeline and no outputs.
    pub fn new(name: impl Into<String>, entry: impl Into<PathBuf>) -> BuildTarget {
        BuildTarget {
            name: name.into(),
            entry: entry.into(),
            outputs: Vec::new(),
            externals: ExternalModules::default(),
            stages: StagePipeline::default(),
            transpiler: None,
            minifier: None,
            enabled: true,
        }
    }

    /// Add an output descriptor.
    pub fn with_output(mut self, output: OutputSpec) -> BuildTarget {
        self.outputs.push(output);
        self
    }

    /// Set the external-module set.
    pub fn with_externals(mut self, externals: ExternalModules) -> BuildTarget {
        self.externals = externals;
        self
    }

    /// Set the stage pipeline.
    pub fn with_stages(mut self, stages: StagePipeline) -> BuildTarget {
        self.stages = stages;
        self
    }

    /// Set the transpiler tool.
    pub fn with_transpiler(mut self, tool: ToolSpec) -> BuildTarget {
        self.transpiler = Some(tool);
        self
    }

    /// Set the minifier tool.
    pub fn with_minifier(mut self, tool: ToolSpec) -> BuildTarget {
        self.minifier = Some(tool);
        self
    }

    /// Mark the target disabled.
    pub fn disabled(mut self) -> BuildTarget {
        self.enabled = false;
        self
    }

    /// Validate the target configuration at assembly time.
    ///
    /// Catches pipeline ordering violations before any file is read.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.stages.validate(&self.name, self.transpiler.is_some())
    }
}
