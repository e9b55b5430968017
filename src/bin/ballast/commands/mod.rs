//! Command implementations.

pub mod build;
pub mod completions;
pub mod targets;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ballast::{BuildConfig, Project};

use crate::cli::Cli;

/// Resolve the project and its build configuration for a command.
pub fn load_project(cli: &Cli) -> Result<(Project, BuildConfig)> {
    let start: PathBuf = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let project = Project::discover(&start)?;
    let config = BuildConfig::load_or_default(project.root())?;
    Ok((project, config))
}
