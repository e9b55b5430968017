//! External tool invocation.
//!
//! The transpiler and minifier are consumed as black boxes: each is an
//! executable found on PATH that reads the artifact from stdin and writes
//! the processed artifact to stdout, call-and-return. Availability is
//! checked before the build touches any file so a missing tool fails with
//! an actionable hint instead of mid-pipeline.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::config::ToolSpec;
use crate::util::process::ProcessBuilder;

/// External tool availability status.
#[derive(Debug, Clone)]
pub enum ToolAvailability {
    /// Tool found on PATH.
    Available {
        /// Resolved executable path.
        path: PathBuf,
    },

    /// Tool is not installed.
    NotInstalled {
        /// Program that was searched for.
        program: String,
    },
}

impl ToolAvailability {
    /// Check if the tool can be invoked.
    pub fn is_available(&self) -> bool {
        matches!(self, ToolAvailability::Available { .. })
    }
}

/// A resolved external tool with a pipeline role.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    role: &'static str,
    spec: ToolSpec,
}

impl ExternalTool {
    /// Wrap a tool spec with its pipeline role ("transpiler", "minifier").
    pub fn new(role: &'static str, spec: ToolSpec) -> ExternalTool {
        ExternalTool { role, spec }
    }

    /// The tool's pipeline role.
    pub fn role(&self) -> &'static str {
        self.role
    }

    /// Look the program up on PATH.
    pub fn availability(&self) -> ToolAvailability {
        match which::which(&self.spec.program) {
            Ok(path) => ToolAvailability::Available { path },
            Err(_) => ToolAvailability::NotInstalled {
                program: self.spec.program.clone(),
            },
        }
    }

    /// Check availability, failing with an install hint when missing.
    pub fn require(&self) -> Result<()> {
        match self.availability() {
            ToolAvailability::Available { path } => {
                tracing::debug!("{} resolved to {}", self.role, path.display());
                Ok(())
            }
            ToolAvailability::NotInstalled { program } => bail!(
                "{} `{}` not found on PATH\n\
                 hint: install it or configure another command under [tools] in Ballast.toml",
                self.role,
                program
            ),
        }
    }

    /// Run the tool as a text filter over the artifact.
    pub fn filter(&self, input: &str) -> Result<String> {
        ProcessBuilder::new(&self.spec.program)
            .args(&self.spec.args)
            .filter(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_reports_hint() {
        let tool = ExternalTool::new(
            "transpiler",
            ToolSpec::new("ballast-no-such-tool", Vec::<String>::new()),
        );
        assert!(!tool.availability().is_available());

        let err = tool.require().unwrap_err();
        assert!(err.to_string().contains("transpiler"));
        assert!(err.to_string().contains("Ballast.toml"));
    }

    #[test]
    #[cfg(unix)]
    fn test_available_tool_filters() {
        let tool = ExternalTool::new("minifier", ToolSpec::new("cat", Vec::<String>::new()));
        assert!(tool.availability().is_available());
        assert!(tool.require().is_ok());
        assert_eq!(tool.filter("var x = 1\n").unwrap(), "var x = 1\n");
    }
}
