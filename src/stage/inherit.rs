//! Inheritance-Patch Stage.
//!
//! Old runtimes do not copy static members from a parent class object to its
//! subclasses, and the downgrading transpiler's generated inheritance helper
//! does not compensate. This stage injects the missing copy into the helper:
//! it locates the helper by a literal marker and inserts a block that copies
//! the parent's own properties onto the child, skipping the reserved names
//! every function object already carries.
//!
//! Marker-based patching is fragile across transpiler versions, so a missing
//! marker is reported as a configuration-mismatch warning instead of passing
//! silently. The content is still returned unmodified; corrupting the
//! artifact is never an option.

use anyhow::Result;

use crate::util::diagnostic::{suggestions, Diagnostic};

use super::{RenderContext, Stage, StageCapabilities};

/// Literal fragment of the transpiler's inheritance-setup helper.
pub const INHERIT_MARKER: &str = "if (superClass) _setPrototypeOf";

/// Code injected immediately before the marker. Copies own static properties
/// from `superClass` to `subClass`, excluding reserved function properties,
/// only where the child's value differs.
const STATIC_COPY_BLOCK: &str = "\
var builtins = ['prototype', '__proto__', 'caller', 'arguments', 'length', 'name']
Object.getOwnPropertyNames(superClass).forEach(function(key) {
\tif (builtins.indexOf(key) !== -1) return
\tif (subClass[key] !== superClass[key]) subClass[key] = superClass[key]
})";

/// Patches the generated inheritance helper to propagate static members.
#[derive(Debug, Clone, Default)]
pub struct InheritancePatch;

impl InheritancePatch {
    /// Create the stage.
    pub fn new() -> InheritancePatch {
        InheritancePatch
    }
}

impl Stage for InheritancePatch {
    fn name(&self) -> &'static str {
        "inherit-statics"
    }

    fn capabilities(&self) -> StageCapabilities {
        StageCapabilities {
            render: true,
            requires_transpiled: true,
            ..Default::default()
        }
    }

    fn render(&self, content: String, ctx: &mut RenderContext) -> Result<String> {
        if !content.contains(INHERIT_MARKER) {
            ctx.warn(
                Diagnostic::warning("inheritance helper marker not found in bundled output")
                    .with_context(format!(
                        "target `{}`, stage `{}` left the artifact unmodified",
                        ctx.target,
                        self.name()
                    ))
                    .with_suggestion(suggestions::MARKER_DRIFT),
            );
            return Ok(content);
        }

        // The transpiler emits the helper once per artifact; patch the first
        // occurrence only.
        let replacement = format!("{}\n{}", STATIC_COPY_BLOCK, INHERIT_MARKER);
        Ok(content.replacen(INHERIT_MARKER, &replacement, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(content: &str) -> (String, RenderContext) {
        let mut ctx = RenderContext::new("mini-legacy");
        let out = InheritancePatch::new()
            .render(content.to_string(), &mut ctx)
            .unwrap();
        (out, ctx)
    }

    #[test]
    fn test_missing_marker_leaves_content_byte_identical() {
        let input = "function _inherits() { /* different shape */ }";
        let (out, ctx) = render(input);
        assert_eq!(out, input);
        assert_eq!(ctx.warnings.len(), 1);
        assert!(ctx.warnings[0]
            .format(false)
            .contains("marker not found"));
        assert!(ctx.warnings[0].format(false).contains("mini-legacy"));
    }

    #[test]
    fn test_marker_present_injects_once() {
        let input = format!(
            "function _inherits(subClass, superClass) {{\n  {} (subClass, superClass)\n}}",
            INHERIT_MARKER
        );
        let (out, ctx) = render(&input);

        assert!(ctx.warnings.is_empty());
        assert_eq!(out.matches("getOwnPropertyNames").count(), 1);
        // The original marker survives, immediately after the injected block.
        assert_eq!(out.matches(INHERIT_MARKER).count(), 1);
        let block_end = out.find("})").unwrap();
        let marker_pos = out.find(INHERIT_MARKER).unwrap();
        assert!(marker_pos > block_end);
    }

    #[test]
    fn test_injected_block_excludes_reserved_names() {
        let input = INHERIT_MARKER.to_string();
        let (out, _) = render(&input);
        for reserved in ["prototype", "__proto__", "caller", "arguments", "length", "name"] {
            assert!(out.contains(reserved), "missing reserved name {reserved}");
        }
        assert!(out.contains("subClass[key] !== superClass[key]"));
    }
}
