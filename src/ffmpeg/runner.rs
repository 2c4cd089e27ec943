use std::io::Read;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::common::progress::create_spinner;
use crate::ui::prelude::{Level, emit};

pub const FFMPEG: &str = "ffmpeg";

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}: {message}")]
    Failed {
        program: &'static str,
        code: Option<i32>,
        message: String,
    },
}

/// Seam between the build logic and the ffmpeg binary.
pub trait FfmpegRunner {
    fn run(&self, args: &[String], options: FfmpegRunOptions) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct FfmpegRunOptions {
    pub message: String,
    pub verbose: bool,
}

impl FfmpegRunOptions {
    pub fn new(message: impl Into<String>, verbose: bool) -> Self {
        Self {
            message: message.into(),
            verbose,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFfmpegRunner;

impl FfmpegRunner for SystemFfmpegRunner {
    fn run(&self, args: &[String], options: FfmpegRunOptions) -> Result<()> {
        emit(
            Level::Debug,
            "ffmpeg.run",
            &format!("{} {}", FFMPEG, args.join(" ")),
            None,
        );

        let mut child = Command::new(FFMPEG)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: FFMPEG,
                source,
            })?;

        let pb = create_spinner(options.message.clone());

        let mut error_lines = Vec::new();
        let mut last_line = String::new();
        let read_result = match child.stderr.take() {
            Some(stderr) => {
                read_ffmpeg_stderr(stderr, options.verbose, &mut last_line, &mut error_lines)
            }
            None => Ok(()),
        };

        let status = child.wait().context("Failed to wait for ffmpeg")?;
        pb.finish_and_clear();
        read_result?;

        if !status.success() {
            let message = if error_lines.is_empty() {
                last_line
            } else {
                error_lines.join("\n")
            };
            return Err(EngineError::Failed {
                program: FFMPEG,
                code: status.code(),
                message: message.trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}

fn read_ffmpeg_stderr<R: Read>(
    mut stderr: R,
    verbose: bool,
    last_line: &mut String,
    error_lines: &mut Vec<String>,
) -> Result<()> {
    let mut buffer = [0u8; 4096];
    let mut accumulated = String::new();

    loop {
        let bytes_read = stderr
            .read(&mut buffer)
            .context("Failed to read ffmpeg stderr")?;
        if bytes_read == 0 {
            break;
        }

        accumulated.push_str(&String::from_utf8_lossy(&buffer[..bytes_read]));

        while let Some(pos) = accumulated.find(|c| c == '\r' || c == '\n') {
            let line = accumulated[..pos].to_string();
            accumulated.replace_range(..=pos, "");
            record_line(line, verbose, last_line, error_lines);
        }
    }

    if !accumulated.trim().is_empty() {
        record_line(accumulated, verbose, last_line, error_lines);
    }

    Ok(())
}

fn record_line(line: String, verbose: bool, last_line: &mut String, error_lines: &mut Vec<String>) {
    if line.trim().is_empty() {
        return;
    }
    if verbose {
        eprintln!("{}", line);
    }
    if is_error_line(&line) {
        error_lines.push(line.clone());
    }
    *last_line = line;
}

fn is_error_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains("error") || lower.contains("invalid") || lower.contains("no such file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_error_lines_from_stderr() {
        let stderr = b"frame=1 fps=0\rError opening input: No such file\nlast words\n";
        let mut last = String::new();
        let mut errors = Vec::new();
        read_ffmpeg_stderr(&stderr[..], false, &mut last, &mut errors).unwrap();
        assert_eq!(errors, vec!["Error opening input: No such file".to_string()]);
        assert_eq!(last, "last words");
    }

    #[test]
    fn keeps_trailing_line_without_newline() {
        let stderr = b"Invalid argument";
        let mut last = String::new();
        let mut errors = Vec::new();
        read_ffmpeg_stderr(&stderr[..], false, &mut last, &mut errors).unwrap();
        assert_eq!(last, "Invalid argument");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn failed_error_names_program_and_code() {
        let err = EngineError::Failed {
            program: FFMPEG,
            code: Some(1),
            message: "Invalid argument".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ffmpeg exited with status Some(1): Invalid argument"
        );
    }
}
