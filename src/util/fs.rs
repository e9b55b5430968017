//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a path with forward-slash separators regardless of platform.
///
/// Import specifiers in JavaScript always use `/`, so paths that end up
/// inside generated source must be normalized before emission.
pub fn forward_slashes(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("dist").join("legacy").join("out.js");

        write_string(&nested, "var x = 1").unwrap();

        assert_eq!(read_to_string(&nested).unwrap(), "var x = 1");
    }

    #[test]
    fn test_relative_path() {
        let rel = relative_path(Path::new("/lib/src/reader"), Path::new("/lib/src/util/shim.js"));
        assert_eq!(rel, PathBuf::from("../util/shim.js"));
    }

    #[test]
    fn test_forward_slashes_on_relative() {
        let rel = relative_path(Path::new("/lib/src/a/b"), Path::new("/lib/src/util/shim.js"));
        assert_eq!(forward_slashes(&rel), "../../util/shim.js");
    }
}
