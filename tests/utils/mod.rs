use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::Command;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Run the built `ose` binary with colors off.
pub fn run_ose(args: &[&str]) -> Result<CommandOutput> {
    let output = Command::new(env!("CARGO_BIN_EXE_ose"))
        .arg("--no-color")
        .args(args)
        .output()?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Create dated folders under `root`, optionally with a placeholder clip.
pub fn create_date_dirs(root: &Path, dirs: &[(&str, bool)]) -> Result<()> {
    for (name, with_clip) in dirs {
        let dir = root.join(name);
        fs::create_dir_all(&dir)?;
        if *with_clip {
            fs::write(dir.join("clip.mp4"), b"not really a video")?;
        }
    }
    Ok(())
}
