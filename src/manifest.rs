//! The concat demuxer manifest and the final concatenation command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::common::files::remove_stale_file;
use crate::ffmpeg::util::path_arg;

/// Render one `file '<path>'` line per artifact. Paths under `base` are
/// written relative to it, since the demuxer resolves them against the
/// manifest's own directory.
pub fn render_manifest(base: &Path, artifacts: &[PathBuf]) -> String {
    artifacts
        .iter()
        .map(|artifact| {
            let relative = artifact.strip_prefix(base).unwrap_or(artifact);
            format!("file '{}'", escape_manifest_path(relative))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Quote handling of the concat demuxer: a `'` ends the quoted string, so it
/// is written as `'\''`. Backslashes are normalized to forward slashes.
fn escape_manifest_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('\'', "'\\''")
}

pub fn write_manifest(manifest: &Path, artifacts: &[PathBuf]) -> Result<()> {
    let base = manifest.parent().unwrap_or_else(|| Path::new(""));
    remove_stale_file(manifest)?;
    fs::write(manifest, render_manifest(base, artifacts))
        .with_context(|| format!("Failed to write concat manifest {}", manifest.display()))
}

/// Stream-copy concatenation; every artifact already shares one profile.
pub fn build_concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-i".to_string(),
        path_arg(manifest),
        "-c".to_string(),
        "copy".to_string(),
        path_arg(output),
    ]
}
