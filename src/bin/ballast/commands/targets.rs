//! `ballast targets` command.

use anyhow::Result;
use ballast::driver::presets;
use ballast::ops::targets;

use crate::cli::{Cli, TargetsArgs};

pub fn execute(cli: &Cli, args: TargetsArgs) -> Result<()> {
    let (project, config) = super::load_project(cli)?;
    let all = presets::default_targets(&project, &config)?;

    for row in targets::list(&all) {
        if args.enabled && !row.enabled {
            continue;
        }
        let marker = if row.enabled { "*" } else { " " };
        println!("{} {:<14} {}", marker, row.name, row.entry);
        for output in &row.outputs {
            println!("      -> {}", output);
        }
    }
    Ok(())
}
