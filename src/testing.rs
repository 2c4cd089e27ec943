//! In-memory stand-ins for ffmpeg and ffprobe.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::ffmpeg::probe::StreamDescriptor;
use crate::ffmpeg::{FfmpegRunOptions, FfmpegRunner, StreamKind, StreamProber};

/// Records every ffmpeg invocation and touches the output file (the last
/// argument) so later stages see it on disk.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Vec<String>>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any invocation whose arguments contain `needle`.
    pub fn failing_on(needle: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: Some(needle.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl FfmpegRunner for RecordingRunner {
    fn run(&self, args: &[String], _options: FfmpegRunOptions) -> Result<()> {
        self.calls.borrow_mut().push(args.to_vec());

        if let Some(needle) = &self.fail_on
            && args.iter().any(|arg| arg.contains(needle.as_str()))
        {
            bail!("ffmpeg exited with status Some(1): simulated failure");
        }

        if let Some(output) = args.last() {
            fs::write(output, b"fake media")?;
        }
        Ok(())
    }
}

/// Canned ffprobe answers keyed by path and stream kind. Unknown paths have
/// no streams.
#[derive(Default)]
pub struct FakeProber {
    streams: HashMap<(PathBuf, StreamKind), Vec<StreamDescriptor>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, kind: StreamKind, stream: StreamDescriptor) -> Self {
        self.streams
            .entry((path.into(), kind))
            .or_default()
            .push(stream);
        self
    }
}

impl StreamProber for FakeProber {
    fn streams(&self, path: &Path, kind: StreamKind) -> Vec<StreamDescriptor> {
        self.streams
            .get(&(path.to_path_buf(), kind))
            .cloned()
            .unwrap_or_default()
    }
}

pub fn aac_48k() -> StreamDescriptor {
    StreamDescriptor {
        codec_name: Some("aac".to_string()),
        codec_type: Some("audio".to_string()),
        codec_time_base: Some("1/48000".to_string()),
        ..Default::default()
    }
}

pub fn mp3_44k() -> StreamDescriptor {
    StreamDescriptor {
        codec_name: Some("mp3".to_string()),
        codec_type: Some("audio".to_string()),
        codec_time_base: Some("1/44100".to_string()),
        ..Default::default()
    }
}

pub fn h264_at(rate: &str) -> StreamDescriptor {
    StreamDescriptor {
        codec_name: Some("h264".to_string()),
        codec_type: Some("video".to_string()),
        avg_frame_rate: Some(rate.to_string()),
        width: Some(1920),
        height: Some(1080),
        ..Default::default()
    }
}

/// Value following the first occurrence of `flag`.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|arg| arg == flag)?;
    args.get(idx + 1).map(String::as_str)
}
