//! Dynamic-Import Annotation Stage.
//!
//! Paths passed to `import()` are resolved at runtime and must not be
//! statically bundled by whatever consumes the artifact. This stage inserts
//! a bundler directive comment right after the opening parenthesis of every
//! dynamic-import call so downstream bundlers skip those call sites.

use anyhow::Result;
use regex::Regex;

use super::{RenderContext, Stage, StageCapabilities};

/// Directive understood by webpack-family bundlers.
pub const IGNORE_DIRECTIVE: &str = "/* webpackIgnore: true */";

/// Annotates every dynamic-import call site in the artifact.
#[derive(Debug, Clone)]
pub struct DynamicImportAnnotation {
    pattern: Regex,
    directive: String,
}

impl Default for DynamicImportAnnotation {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicImportAnnotation {
    /// Create the stage with the webpack ignore directive.
    pub fn new() -> DynamicImportAnnotation {
        DynamicImportAnnotation {
            // `\b` keeps identifiers like `myimport(` out; this still matches
            // inside strings and comments, same tradeoff as the capability
            // rewrite.
            pattern: Regex::new(r"\bimport\s*\(").unwrap(),
            directive: IGNORE_DIRECTIVE.to_string(),
        }
    }

    /// Use a different directive comment.
    pub fn with_directive(mut self, directive: impl Into<String>) -> DynamicImportAnnotation {
        self.directive = directive.into();
        self
    }
}

impl Stage for DynamicImportAnnotation {
    fn name(&self) -> &'static str {
        "annotate-dynamic-import"
    }

    fn capabilities(&self) -> StageCapabilities {
        StageCapabilities {
            render: true,
            ..Default::default()
        }
    }

    fn render(&self, content: String, _ctx: &mut RenderContext) -> Result<String> {
        let annotated = self
            .pattern
            .replace_all(&content, |caps: &regex::Captures<'_>| {
                format!("{}{} ", &caps[0], self.directive)
            });
        Ok(annotated.into_owned())
    }
}
