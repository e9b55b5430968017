//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context, Result};

/// Builder for subprocess execution.
///
/// Tools in the pipeline (transpiler, minifier) are filters: they read the
/// artifact from stdin and write the processed artifact to stdout.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    stdin: Option<Vec<u8>>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Set stdin data.
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Execute the command and wait for completion, capturing output.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if self.stdin.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        if let Some(ref data) = self.stdin {
            let mut handle = child
                .stdin
                .take()
                .with_context(|| format!("failed to open stdin of `{}`", self.program.display()))?;
            handle
                .write_all(data)
                .with_context(|| format!("failed to write stdin of `{}`", self.program.display()))?;
            // Dropping the handle closes the pipe so the filter sees EOF.
        }

        child
            .wait_with_output()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))
    }

    /// Execute as a text filter: feed `input` to stdin, return stdout.
    ///
    /// Fails with the tool's stderr when it exits nonzero.
    pub fn filter(&self, input: &str) -> Result<String> {
        let output = self.clone().stdin(input.as_bytes().to_vec()).exec()?;

        if !output.status.success() {
            bail!(
                "`{}` exited with {}\n{}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim_end()
            );
        }

        String::from_utf8(output.stdout)
            .with_context(|| format!("`{}` produced non-UTF-8 output", self.program.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_filter_passthrough() {
        let out = ProcessBuilder::new("cat").filter("let a = 1\n").unwrap();
        assert_eq!(out, "let a = 1\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_filter_reports_failure() {
        let err = ProcessBuilder::new("false").filter("x").unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[test]
    fn test_spawn_missing_program() {
        let err = ProcessBuilder::new("ballast-no-such-tool").exec().unwrap_err();
        assert!(err.to_string().contains("failed to spawn"));
    }
}
