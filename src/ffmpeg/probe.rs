//! Stream inspection through ffprobe.
//!
//! Probing never fails from the caller's point of view: a missing file, a
//! crashed ffprobe or unexpected JSON all come back as "no streams", which the
//! build logic treats as the most conservative case.

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use super::profile::{AUDIO_CODEC, TARGET_FPS, TARGET_SAMPLE_RATE};
use crate::ui::prelude::{Level, emit};

pub const FFPROBE: &str = "ffprobe";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Audio,
    Video,
}

impl StreamKind {
    pub fn selector(self) -> &'static str {
        match self {
            StreamKind::Audio => "a",
            StreamKind::Video => "v",
        }
    }
}

/// The subset of an ffprobe `streams[]` entry that the normalization
/// decisions look at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StreamDescriptor {
    pub index: Option<u32>,
    pub codec_name: Option<String>,
    pub codec_type: Option<String>,
    pub codec_time_base: Option<String>,
    pub avg_frame_rate: Option<String>,
    pub sample_rate: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Option<Vec<StreamDescriptor>>,
}

pub trait StreamProber {
    fn streams(&self, path: &Path, kind: StreamKind) -> Vec<StreamDescriptor>;

    /// First stream of the given kind. Files with several streams of one kind
    /// are judged by the first one.
    fn first_stream(&self, path: &Path, kind: StreamKind) -> Option<StreamDescriptor> {
        self.streams(path, kind).into_iter().next()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemStreamProber;

impl StreamProber for SystemStreamProber {
    fn streams(&self, path: &Path, kind: StreamKind) -> Vec<StreamDescriptor> {
        if !path.exists() {
            return Vec::new();
        }

        let output = Command::new(FFPROBE)
            .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
            .args(["-select_streams", kind.selector()])
            .arg("-i")
            .arg(path)
            .output();

        match output {
            Ok(output) if output.status.success() => parse_probe_output(&output.stdout),
            Ok(output) => {
                emit(
                    Level::Debug,
                    "probe.failed",
                    &format!(
                        "ffprobe exited with status {:?} for {}",
                        output.status.code(),
                        path.display()
                    ),
                    None,
                );
                Vec::new()
            }
            Err(err) => {
                emit(
                    Level::Debug,
                    "probe.spawn",
                    &format!("Failed to run ffprobe for {}: {}", path.display(), err),
                    None,
                );
                Vec::new()
            }
        }
    }
}

/// Parse ffprobe's `-print_format json -show_streams` output.
pub fn parse_probe_output(stdout: &[u8]) -> Vec<StreamDescriptor> {
    match serde_json::from_slice::<ProbeOutput>(stdout) {
        Ok(parsed) => parsed.streams.unwrap_or_default(),
        Err(err) => {
            emit(
                Level::Debug,
                "probe.parse",
                &format!("Ignoring malformed ffprobe output: {}", err),
                None,
            );
            Vec::new()
        }
    }
}

/// Parse `num/den` (or a bare integer) as reported by ffprobe. Rejects a zero
/// denominator.
pub fn parse_ratio(text: &str) -> Option<(i64, i64)> {
    let text = text.trim();
    let (num, den) = match text.split_once('/') {
        Some((num, den)) => (num.trim().parse().ok()?, den.trim().parse().ok()?),
        None => (text.parse().ok()?, 1),
    };
    if den == 0 {
        return None;
    }
    Some((num, den))
}

fn ratio_equals(text: &str, num: i64, den: i64) -> bool {
    match parse_ratio(text) {
        Some((a, b)) => i128::from(a) * i128::from(den) == i128::from(num) * i128::from(b),
        None => false,
    }
}

/// AAC at 48 kHz. Older ffprobe releases report the rate through
/// `codec_time_base`; newer ones dropped that field, so `sample_rate` is the
/// fallback.
pub fn is_audio_normalized(stream: &StreamDescriptor) -> bool {
    if stream.codec_name.as_deref() != Some(AUDIO_CODEC) {
        return false;
    }

    match (&stream.codec_time_base, &stream.sample_rate) {
        (Some(time_base), _) => ratio_equals(time_base, 1, i64::from(TARGET_SAMPLE_RATE)),
        (None, Some(rate)) => rate.trim().parse::<u32>().ok() == Some(TARGET_SAMPLE_RATE),
        (None, None) => false,
    }
}

pub fn is_video_at_30fps(stream: &StreamDescriptor) -> bool {
    stream
        .avg_frame_rate
        .as_deref()
        .is_some_and(|rate| ratio_equals(rate, i64::from(TARGET_FPS), 1))
}
