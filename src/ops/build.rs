//! Implementation of `ballast build`.

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::core::project::Project;
use crate::core::target::BuildTarget;
use crate::driver::{build_target, Bundler, TargetOutcome};
use crate::util::diagnostic::{self, suggestions};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Specific targets to build (empty = all enabled targets).
    ///
    /// Naming a disabled target builds it anyway; disabling only removes a
    /// target from default builds.
    pub targets: Vec<String>,

    /// Build every configured target, enabled or not.
    pub all: bool,
}

/// Validate that all requested targets exist.
///
/// This prevents silent no-ops when the user specifies a nonexistent target.
fn validate_target_filter(targets: &[BuildTarget], requested: &[String]) -> Result<()> {
    for name in requested {
        if !targets.iter().any(|t| &t.name == name) {
            let available: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
            bail!(
                "unknown target `{}`\n\
                 available targets: {}\n\
                 {}",
                name,
                if available.is_empty() {
                    "(none)".to_string()
                } else {
                    available.join(", ")
                },
                suggestions::TARGET_NOT_FOUND
            );
        }
    }
    Ok(())
}

/// Select the targets a build run covers.
pub fn select_targets<'a>(
    targets: &'a [BuildTarget],
    opts: &BuildOptions,
) -> Result<Vec<&'a BuildTarget>> {
    if opts.all {
        return Ok(targets.iter().collect());
    }
    if opts.targets.is_empty() {
        let enabled: Vec<&BuildTarget> = targets.iter().filter(|t| t.enabled).collect();
        if enabled.is_empty() {
            bail!("no targets are enabled\nhint: enable one under [targets] in Ballast.toml");
        }
        return Ok(enabled);
    }

    validate_target_filter(targets, &opts.targets)?;
    Ok(targets
        .iter()
        .filter(|t| opts.targets.iter().any(|name| name == &t.name))
        .collect())
}

/// Build the selected targets.
///
/// Targets are independent: they share only read-only configuration, so they
/// run in parallel, and one target's failure leaves the others unaffected.
/// The build as a whole fails if any target failed.
pub fn build(
    project: &Project,
    targets: &[BuildTarget],
    bundler: &(dyn Bundler + Sync),
    opts: &BuildOptions,
) -> Result<Vec<TargetOutcome>> {
    let selected = select_targets(targets, opts)?;

    let names: Vec<&str> = selected.iter().map(|t| t.name.as_str()).collect();
    tracing::info!("building targets: {}", names.join(", "));

    let progress = ProgressBar::new(selected.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let results: Vec<(String, Result<TargetOutcome>)> = selected
        .par_iter()
        .map(|target| {
            let outcome = build_target(project, target, bundler);
            progress.inc(1);
            (target.name.clone(), outcome)
        })
        .collect();
    progress.finish_and_clear();

    let mut outcomes = Vec::new();
    let mut failed = Vec::new();
    for (name, result) in results {
        match result {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    diagnostic::emit(warning, false);
                }
                outcomes.push(outcome);
            }
            Err(err) => {
                tracing::error!("target `{}` failed: {:#}", name, err);
                failed.push(name);
            }
        }
    }

    if !failed.is_empty() {
        bail!(
            "{} of {} targets failed: {}",
            failed.len(),
            selected.len(),
            failed.join(", ")
        );
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::Manifest;
    use crate::core::target::OutputSpec;
    use crate::driver::LinkerBundler;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn fixture() -> Vec<BuildTarget> {
        vec![
            BuildTarget::new("mini-legacy", "src/bundle-mini.js"),
            BuildTarget::new("mini-modern", "src/bundle-mini.js").disabled(),
        ]
    }

    #[test]
    fn test_select_defaults_to_enabled() {
        let targets = fixture();
        let selected = select_targets(&targets, &BuildOptions::default()).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "mini-legacy");
    }

    #[test]
    fn test_select_explicit_includes_disabled() {
        let targets = fixture();
        let opts = BuildOptions {
            targets: vec!["mini-modern".to_string()],
            all: false,
        };
        let selected = select_targets(&targets, &opts).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "mini-modern");
    }

    #[test]
    fn test_select_all() {
        let targets = fixture();
        let opts = BuildOptions {
            targets: vec![],
            all: true,
        };
        assert_eq!(select_targets(&targets, &opts).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let targets = fixture();
        let opts = BuildOptions {
            targets: vec!["nonexistent".to_string()],
            all: false,
        };
        let err = select_targets(&targets, &opts).unwrap_err();
        assert!(err.to_string().contains("unknown target"));
        assert!(err.to_string().contains("available targets"));
    }

    #[test]
    fn test_failed_target_does_not_block_others() {
        let tmp = TempDir::new().unwrap();
        stdfs::create_dir_all(tmp.path().join("src")).unwrap();
        stdfs::write(tmp.path().join("src/good.js"), "export var ok = 1\n").unwrap();

        let manifest = Manifest::parse(r#"{"name": "mylib"}"#).unwrap();
        let project = Project::new(tmp.path(), manifest);

        let targets = vec![
            BuildTarget::new("good", "src/good.js")
                .with_output(OutputSpec::umd("dist/good.umd.js", "mylib")),
            BuildTarget::new("bad", "src/missing.js")
                .with_output(OutputSpec::umd("dist/bad.umd.js", "mylib")),
        ];

        let opts = BuildOptions {
            targets: vec![],
            all: true,
        };
        let err = build(&project, &targets, &LinkerBundler::new(), &opts).unwrap_err();
        assert!(err.to_string().contains("1 of 2 targets failed"));
        assert!(err.to_string().contains("bad"));
        // The independent target still produced its artifact.
        assert!(tmp.path().join("dist/good.umd.js").exists());
    }
}
