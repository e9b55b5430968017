//! `Ballast.toml` build configuration.
//!
//! The config file is optional; every field has a default that mirrors the
//! stock pipeline. It mainly exists to point the driver at the external
//! transpiler/minifier commands and to override which targets are enabled.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::util::fs;

/// Config file name.
pub const CONFIG_FILE: &str = "Ballast.toml";

/// An external tool invocation: program plus fixed arguments.
///
/// Accepts either a bare program name or a full argv array in TOML:
/// `transpiler = "babel"` or `transpiler = ["babel", "--no-babelrc"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ToolSpecDe")]
pub struct ToolSpec {
    /// Program name or path, resolved against PATH at build time.
    pub program: String,

    /// Fixed arguments passed on every invocation.
    pub args: Vec<String>,
}

impl ToolSpec {
    /// Create a tool spec from a program and arguments.
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        ToolSpec {
            program: program.into(),
            args: args.into_iter().map(|a| a.into()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ToolSpecDe {
    Command(String),
    Argv(Vec<String>),
}

impl TryFrom<ToolSpecDe> for ToolSpec {
    type Error = String;

    fn try_from(de: ToolSpecDe) -> Result<Self, Self::Error> {
        match de {
            ToolSpecDe::Command(program) => {
                if program.is_empty() {
                    return Err("tool command must not be empty".to_string());
                }
                Ok(ToolSpec {
                    program,
                    args: Vec::new(),
                })
            }
            ToolSpecDe::Argv(argv) => {
                let mut parts = argv.into_iter();
                let program = parts
                    .next()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| "tool argv must start with a program name".to_string())?;
                Ok(ToolSpec {
                    program,
                    args: parts.collect(),
                })
            }
        }
    }
}

/// External tool commands from the `[tools]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Language-downgrading transpiler, run as a stdin/stdout filter.
    pub transpiler: ToolSpec,

    /// Minifier, run as a stdin/stdout filter. `None` skips minification.
    pub minifier: Option<ToolSpec>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            transpiler: ToolSpec::new("babel", ["--no-babelrc", "--presets", "@babel/preset-env"]),
            minifier: Some(ToolSpec::new("terser", ["--compress", "--mangle", "--toplevel"])),
        }
    }
}

/// Legacy-pipeline settings from the `[legacy]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Path (relative to the project root) of the shim-definition unit.
    pub shim: PathBuf,

    /// File names whose content is replaced with an empty-module stub
    /// because the feature they implement is unavailable on the target.
    pub stub_files: Vec<String>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        LegacyConfig {
            shim: PathBuf::from("src/util/polyfill.js"),
            stub_files: vec!["FsReader.js".to_string()],
        }
    }
}

/// Target overrides from the `[targets]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Names of targets to enable, replacing the preset enabled set.
    pub enabled: Option<Vec<String>>,
}

/// The parsed build configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory, relative to the project root.
    pub dist_dir: PathBuf,

    /// External tool commands.
    pub tools: ToolsConfig,

    /// Legacy-pipeline settings.
    pub legacy: LegacyConfig,

    /// Target overrides.
    pub targets: TargetsConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            dist_dir: PathBuf::from("dist"),
            tools: ToolsConfig::default(),
            legacy: LegacyConfig::default(),
            targets: TargetsConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Load `Ballast.toml` from the project root, or defaults when absent.
    pub fn load_or_default(root: &Path) -> Result<BuildConfig> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(BuildConfig::default());
        }
        let content = fs::read_to_string(&path)?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }
}
