//! Path utilities for locating workspace files from tests.

use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Returns the workspace root directory.
///
/// Determined by walking up from this crate's manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Path to the example configuration shipped in `config/ows.yaml`.
pub fn example_config_path() -> PathBuf {
    workspace_root().join("config").join("ows.yaml")
}

/// Write `content` to a temporary file with the given extension.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_temp_config(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .expect("failed to create temp config");
    file.write_all(content.as_bytes())
        .expect("failed to write temp config");
    file
}
