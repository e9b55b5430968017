//! `ballast build` command.

use anyhow::Result;
use ballast::driver::{presets, LinkerBundler};
use ballast::ops::build::{self, BuildOptions};

use crate::cli::{BuildArgs, Cli};

pub fn execute(cli: &Cli, args: BuildArgs) -> Result<()> {
    let (project, config) = super::load_project(cli)?;
    let targets = presets::default_targets(&project, &config)?;

    let opts = BuildOptions {
        targets: args.targets,
        all: args.all,
    };
    let outcomes = build::build(&project, &targets, &LinkerBundler::new(), &opts)?;

    for outcome in &outcomes {
        for artifact in &outcome.artifacts {
            println!(
                "{}  {}  sha256:{}",
                outcome.target,
                artifact.path.display(),
                &artifact.digest[..12]
            );
        }
    }
    Ok(())
}
