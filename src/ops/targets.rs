//! Implementation of `ballast targets`.

use crate::core::target::BuildTarget;

/// One row of the target listing.
#[derive(Debug, Clone)]
pub struct TargetRow {
    /// Target name.
    pub name: String,

    /// Whether default builds include it.
    pub enabled: bool,

    /// Entry unit path.
    pub entry: String,

    /// Output descriptions, `path (format)` each.
    pub outputs: Vec<String>,
}

/// Describe the configured targets for listing.
pub fn list(targets: &[BuildTarget]) -> Vec<TargetRow> {
    targets
        .iter()
        .map(|target| TargetRow {
            name: target.name.clone(),
            enabled: target.enabled,
            entry: target.entry.display().to_string(),
            outputs: target
                .outputs
                .iter()
                .map(|o| format!("{} ({})", o.path.display(), o.format.as_str()))
                .collect(),
        })
        .collect()
}
