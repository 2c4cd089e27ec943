//! External tools the compilation shells out to.

use anyhow::{Result, bail};

#[derive(Debug)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    /// Package providing the binary on common distributions
    pub package: &'static str,
}

impl Tool {
    pub fn is_installed(&self) -> bool {
        which::which(self.name).is_ok()
    }
}

pub static FFMPEG: Tool = Tool {
    name: crate::ffmpeg::runner::FFMPEG,
    description: "Encodes, filters and concatenates the clips",
    package: "ffmpeg",
};

pub static FFPROBE: Tool = Tool {
    name: crate::ffmpeg::probe::FFPROBE,
    description: "Reports stream metadata used for reuse decisions",
    package: "ffmpeg",
};

pub static REQUIRED_TOOLS: &[&Tool] = &[&FFMPEG, &FFPROBE];

/// Fail with an install hint when a required tool is missing from PATH.
pub fn ensure_tools(tools: &[&Tool]) -> Result<()> {
    let missing: Vec<&Tool> = tools.iter().copied().filter(|t| !t.is_installed()).collect();
    if missing.is_empty() {
        return Ok(());
    }

    let lines = missing
        .iter()
        .map(|t| format!("  {} ({}), install package '{}'", t.name, t.description, t.package))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("Required tools are not installed:\n{}", lines);
}
