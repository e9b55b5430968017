//! File Substitution Stage.
//!
//! Intercepts resolution of a specific module name and serves a fixed stub
//! in its place, before any other stage sees it. Used for targets where the
//! feature a file implements (filesystem access, say) does not exist: the
//! real file and its entire dependency subtree are never read.

use std::path::Path;

use super::{Stage, StageCapabilities};

/// Default replacement: an empty module.
pub const EMPTY_MODULE_STUB: &str = "export default {}";

/// Replaces a named file with stub content during resolution.
#[derive(Debug, Clone)]
pub struct FileSubstitution {
    file_name: String,
    synthetic_id: String,
    replacement: String,
}

impl FileSubstitution {
    /// Substitute `file_name` with the empty-module stub.
    ///
    /// The synthetic identifier is deterministic and carries the `\0` prefix
    /// conventionally used for virtual modules, so no real path can collide
    /// with it.
    pub fn new(file_name: impl Into<String>) -> FileSubstitution {
        let file_name = file_name.into();
        FileSubstitution {
            synthetic_id: format!("\0ballast:substitute:{}", file_name),
            file_name,
            replacement: EMPTY_MODULE_STUB.to_string(),
        }
    }

    /// Use custom replacement content instead of the empty-module stub.
    pub fn with_replacement(mut self, replacement: impl Into<String>) -> FileSubstitution {
        self.replacement = replacement.into();
        self
    }

    /// The synthetic identifier this stage resolves to.
    pub fn synthetic_id(&self) -> &str {
        &self.synthetic_id
    }
}

impl Stage for FileSubstitution {
    fn name(&self) -> &'static str {
        "substitute-file"
    }

    fn capabilities(&self) -> StageCapabilities {
        StageCapabilities {
            resolve: true,
            load: true,
            ..Default::default()
        }
    }

    fn resolve(&self, specifier: &str, _importer: Option<&Path>) -> Option<String> {
        let matches = Path::new(specifier)
            .file_name()
            .is_some_and(|segment| segment.to_string_lossy() == self.file_name);
        if matches {
            Some(self.synthetic_id.clone())
        } else {
            None
        }
    }

    fn load(&self, id: &str) -> Option<String> {
        if id == self.synthetic_id {
            Some(self.replacement.clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_matching_specifier() {
        let stage = FileSubstitution::new("FsReader.js");
        let id = stage.resolve("./file/FsReader.js", None).unwrap();
        assert_eq!(id, stage.synthetic_id());
    }

    #[test]
    fn test_resolve_bare_file_name() {
        let stage = FileSubstitution::new("FsReader.js");
        assert!(stage.resolve("FsReader.js", None).is_some());
    }

    #[test]
    fn test_resolve_no_opinion() {
        let stage = FileSubstitution::new("FsReader.js");
        assert_eq!(stage.resolve("./file/UrlReader.js", None), None);
        // A partial segment match is not a match.
        assert_eq!(stage.resolve("./file/MyFsReader.js.map", None), None);
    }

    #[test]
    fn test_load_synthetic_id() {
        let stage = FileSubstitution::new("FsReader.js");
        let id = stage.synthetic_id().to_string();
        assert_eq!(stage.load(&id).unwrap(), EMPTY_MODULE_STUB);
    }

    #[test]
    fn test_load_no_opinion_for_real_paths() {
        let stage = FileSubstitution::new("FsReader.js");
        assert_eq!(stage.load("/lib/src/file/FsReader.js"), None);
    }

    #[test]
    fn test_custom_replacement() {
        let stage = FileSubstitution::new("BufferShim.js").with_replacement("export var noop = 1");
        let id = stage.synthetic_id().to_string();
        assert_eq!(stage.load(&id).unwrap(), "export var noop = 1");
    }
}
