//! Normalizing one dated clip to the shared encoding profile.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::common::files::remove_stale_file;
use crate::config::CompileConfig;
use crate::ffmpeg::Engine;
use crate::ffmpeg::filter::{BlankAudio, FilterChain, TextOverlay};
use crate::ffmpeg::probe::{StreamDescriptor, StreamKind, is_audio_normalized, is_video_at_30fps};
use crate::ffmpeg::profile::{AudioPlan, VideoEncodeProfile, target_size};
use crate::ffmpeg::util::path_arg;
use crate::scan::ClipDirectory;
use crate::ui::prelude::{Level, emit};

const DATE_STAMP_X: &str = "120";
const DATE_STAMP_Y: &str = "960";
const DATE_STAMP_FONT_SIZE: u32 = 45;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipOutcome {
    /// The existing output already matches the profile.
    Reused(PathBuf),
    Built { path: PathBuf, audio: AudioPlan },
    /// No source clip in the directory; nothing to concatenate.
    MissingSource,
}

impl ClipOutcome {
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            ClipOutcome::Reused(path) | ClipOutcome::Built { path, .. } => Some(path),
            ClipOutcome::MissingSource => None,
        }
    }
}

/// Everything the argument builder needs for one clip.
#[derive(Debug, Clone)]
pub struct ClipBuildRequest<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    pub date_text: &'a str,
    pub audio: AudioPlan,
    pub font_file: &'a Path,
    pub video_bitrate: &'a str,
}

pub fn choose_audio_plan(source_audio: Option<&StreamDescriptor>) -> AudioPlan {
    match source_audio {
        None => AudioPlan::Synthetic,
        Some(stream) if is_audio_normalized(stream) => AudioPlan::Copy,
        Some(_) => AudioPlan::Reencode,
    }
}

/// ffmpeg arguments that scale, date-stamp and re-encode one clip.
pub fn build_clip_args(request: &ClipBuildRequest<'_>) -> Vec<String> {
    let mut args = vec!["-y".to_string(), "-i".to_string(), path_arg(request.source)];

    if request.audio == AudioPlan::Synthetic {
        args.push("-f".to_string());
        args.push("lavfi".to_string());
        args.push("-i".to_string());
        args.push(BlankAudio::default().to_filter().compile());
    }

    let date_stamp = TextOverlay::new(request.date_text, DATE_STAMP_X, DATE_STAMP_Y)
        .font_size(DATE_STAMP_FONT_SIZE)
        .to_filter(request.font_file);
    let mut video_filters = FilterChain::new();
    video_filters
        .push(format!("scale={}", target_size()))
        .push_filter(&date_stamp);

    args.push("-vf".to_string());
    args.push(video_filters.join());

    VideoEncodeProfile {
        bitrate: Some(request.video_bitrate),
    }
    .push_to(&mut args);
    request.audio.push_to(&mut args);

    args.push("-shortest".to_string());
    args.push(path_arg(request.output));
    args
}

pub struct ClipNormalizer<'a> {
    config: &'a CompileConfig,
    engine: Engine<'a>,
}

impl<'a> ClipNormalizer<'a> {
    pub fn new(config: &'a CompileConfig, engine: Engine<'a>) -> Self {
        Self { config, engine }
    }

    pub fn source_path(&self, dir: &ClipDirectory) -> PathBuf {
        dir.path.join(&self.config.clip_file_name)
    }

    pub fn output_path(&self, dir: &ClipDirectory) -> PathBuf {
        dir.path.join(&self.config.output_file_name)
    }

    /// An existing output is reusable when its audio is AAC/48 kHz and its
    /// video runs at exactly 30 fps.
    ///
    /// This only inspects the output itself. A source clip that changed after
    /// the output was produced is not detected.
    pub fn can_reuse(&self, output: &Path) -> bool {
        if !output.exists() {
            return false;
        }

        let audio_ok = self
            .engine
            .prober
            .first_stream(output, StreamKind::Audio)
            .is_some_and(|stream| is_audio_normalized(&stream));
        if !audio_ok {
            return false;
        }

        self.engine
            .prober
            .first_stream(output, StreamKind::Video)
            .is_some_and(|stream| is_video_at_30fps(&stream))
    }

    pub fn normalize(&self, dir: &ClipDirectory, reuse_allowed: bool) -> Result<ClipOutcome> {
        let source = self.source_path(dir);
        let output = self.output_path(dir);

        if !source.exists() {
            emit(
                Level::Warn,
                "clip.missing",
                &format!("Did not find clip for folder {}", dir.name()),
                Some(serde_json::json!({ "dir": dir.name() })),
            );
            return Ok(ClipOutcome::MissingSource);
        }

        if reuse_allowed && self.can_reuse(&output) {
            emit(
                Level::Info,
                "clip.reuse",
                &format!("Reusing output for dir: {}", dir.name()),
                Some(serde_json::json!({ "dir": dir.name() })),
            );
            return Ok(ClipOutcome::Reused(output));
        }

        let date_text = dir.display_date();
        emit(
            Level::Info,
            "clip.build",
            &format!("Creating video. Dir: {}, Date: {}", dir.name(), date_text),
            Some(serde_json::json!({ "dir": dir.name(), "date": date_text })),
        );

        remove_stale_file(&output)?;

        let source_audio = self.engine.prober.first_stream(&source, StreamKind::Audio);
        let audio = choose_audio_plan(source_audio.as_ref());
        if audio == AudioPlan::Reencode {
            emit(
                Level::Info,
                "clip.audio.convert",
                "Found audio stream, but it is in wrong format. Converting.",
                None,
            );
        }

        let font_file = self.config.font_file()?;
        let args = build_clip_args(&ClipBuildRequest {
            source: &source,
            output: &output,
            date_text: &date_text,
            audio,
            font_file: &font_file,
            video_bitrate: &self.config.video_bitrate,
        });

        self.engine
            .run(&args, format!("normalizing {}", dir.name()))
            .with_context(|| format!("Failed to normalize clip in {}", dir.path.display()))?;

        Ok(ClipOutcome::Built {
            path: output,
            audio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::dates::decode_dir_name;
    use crate::testing::{FakeProber, RecordingRunner, aac_48k, flag_value, h264_at, mp3_44k};

    fn clip_dir(root: &Path, name: &str, with_clip: bool) -> ClipDirectory {
        let path = root.join(name);
        fs::create_dir_all(&path).unwrap();
        if with_clip {
            fs::write(path.join("clip.mp4"), b"source").unwrap();
        }
        ClipDirectory {
            entry: decode_dir_name(name).unwrap(),
            path,
        }
    }

    fn request<'a>(audio: AudioPlan, font: &'a Path) -> ClipBuildRequest<'a> {
        ClipBuildRequest {
            source: Path::new("20230101/clip.mp4"),
            output: Path::new("20230101/output.mp4"),
            date_text: "Jan 1, 2023",
            audio,
            font_file: font,
            video_bitrate: "4000k",
        }
    }

    #[test]
    fn audio_plan_follows_source_stream() {
        assert_eq!(choose_audio_plan(None), AudioPlan::Synthetic);
        assert_eq!(choose_audio_plan(Some(&aac_48k())), AudioPlan::Copy);
        assert_eq!(choose_audio_plan(Some(&mp3_44k())), AudioPlan::Reencode);
    }

    #[test]
    fn synthetic_audio_adds_lavfi_input() {
        let font = PathBuf::from("/res/mmrtextb.ttf");
        let args = build_clip_args(&request(AudioPlan::Synthetic, &font));

        let inputs: Vec<&str> = args
            .iter()
            .enumerate()
            .filter(|(_, arg)| *arg == "-i")
            .map(|(idx, _)| args[idx + 1].as_str())
            .collect();
        assert_eq!(
            inputs,
            [
                "20230101/clip.mp4",
                "anullsrc=channel_layout=stereo:sample_rate=48000"
            ]
        );
        assert_eq!(flag_value(&args, "-f"), Some("lavfi"));
        assert_eq!(flag_value(&args, "-c:a"), Some("aac"));
        assert!(args.contains(&"-shortest".to_string()));
        assert_eq!(args.last().unwrap(), "20230101/output.mp4");
    }

    #[test]
    fn video_is_scaled_stamped_and_reencoded() {
        let font = PathBuf::from("/res/mmrtextb.ttf");
        let args = build_clip_args(&request(AudioPlan::Copy, &font));

        let vf = flag_value(&args, "-vf").unwrap();
        assert!(vf.starts_with("scale=1920x1080,drawtext="));
        assert!(vf.contains("text='Jan 1, 2023'"));
        assert!(vf.contains("x=120:y=960"));
        assert!(vf.contains("fontsize=45"));
        assert_eq!(flag_value(&args, "-c:v"), Some("libx264"));
        assert_eq!(flag_value(&args, "-r"), Some("30"));
        assert_eq!(flag_value(&args, "-b:v"), Some("4000k"));
        assert_eq!(flag_value(&args, "-pix_fmt"), Some("yuv420p"));
        assert_eq!(flag_value(&args, "-c:a"), Some("copy"));
        assert!(!args.contains(&"lavfi".to_string()));
    }

    #[test]
    fn mismatched_audio_is_reencoded_to_48k() {
        let font = PathBuf::from("font.ttf");
        let args = build_clip_args(&request(AudioPlan::Reencode, &font));
        assert_eq!(flag_value(&args, "-c:a"), Some("aac"));
        assert_eq!(flag_value(&args, "-ar"), Some("48000"));
    }

    #[test]
    fn missing_source_yields_no_artifact() {
        let root = tempfile::tempdir().unwrap();
        let dir = clip_dir(root.path(), "20230101", false);
        let config = CompileConfig::default();
        let runner = RecordingRunner::new();
        let prober = FakeProber::new();
        let normalizer = ClipNormalizer::new(&config, Engine::new(&runner, &prober, false));

        let outcome = normalizer.normalize(&dir, true).unwrap();
        assert_eq!(outcome, ClipOutcome::MissingSource);
        assert!(outcome.artifact().is_none());
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn matching_output_is_reused_without_running_ffmpeg() {
        let root = tempfile::tempdir().unwrap();
        let dir = clip_dir(root.path(), "20230101", true);
        let output = dir.path.join("output.mp4");
        fs::write(&output, b"previous run").unwrap();

        let config = CompileConfig::default();
        let runner = RecordingRunner::new();
        let prober = FakeProber::new()
            .with(&output, StreamKind::Audio, aac_48k())
            .with(&output, StreamKind::Video, h264_at("30/1"));
        let normalizer = ClipNormalizer::new(&config, Engine::new(&runner, &prober, false));

        let outcome = normalizer.normalize(&dir, true).unwrap();
        assert_eq!(outcome, ClipOutcome::Reused(output.clone()));
        assert_eq!(runner.call_count(), 0);
        assert_eq!(fs::read(&output).unwrap(), b"previous run");
    }

    #[test]
    fn reuse_disallowed_always_rebuilds() {
        let root = tempfile::tempdir().unwrap();
        let dir = clip_dir(root.path(), "20230101", true);
        let output = dir.path.join("output.mp4");
        fs::write(&output, b"previous run").unwrap();

        let config = CompileConfig::default();
        let runner = RecordingRunner::new();
        let prober = FakeProber::new()
            .with(&output, StreamKind::Audio, aac_48k())
            .with(&output, StreamKind::Video, h264_at("30/1"));
        let normalizer = ClipNormalizer::new(&config, Engine::new(&runner, &prober, false));

        let outcome = normalizer.normalize(&dir, false).unwrap();
        assert_eq!(
            outcome,
            ClipOutcome::Built {
                path: output.clone(),
                audio: AudioPlan::Synthetic,
            }
        );
        assert_eq!(runner.call_count(), 1);
        assert_eq!(fs::read(&output).unwrap(), b"fake media");
    }

    #[test]
    fn output_at_wrong_frame_rate_is_rebuilt() {
        let root = tempfile::tempdir().unwrap();
        let dir = clip_dir(root.path(), "2023-01-01", true);
        let output = dir.path.join("output.mp4");
        fs::write(&output, b"previous run").unwrap();
        let source = dir.path.join("clip.mp4");

        let config = CompileConfig::default();
        let runner = RecordingRunner::new();
        let prober = FakeProber::new()
            .with(&output, StreamKind::Audio, aac_48k())
            .with(&output, StreamKind::Video, h264_at("30000/1001"))
            .with(&source, StreamKind::Audio, aac_48k());
        let normalizer = ClipNormalizer::new(&config, Engine::new(&runner, &prober, false));

        let outcome = normalizer.normalize(&dir, true).unwrap();
        assert_eq!(
            outcome,
            ClipOutcome::Built {
                path: output,
                audio: AudioPlan::Copy,
            }
        );
        assert_eq!(runner.call_count(), 1);
    }

    #[test]
    fn output_without_audio_is_not_reused() {
        let root = tempfile::tempdir().unwrap();
        let dir = clip_dir(root.path(), "20230101", true);
        let output = dir.path.join("output.mp4");
        fs::write(&output, b"previous run").unwrap();

        let config = CompileConfig::default();
        let runner = RecordingRunner::new();
        let prober = FakeProber::new().with(&output, StreamKind::Video, h264_at("30/1"));
        let normalizer = ClipNormalizer::new(&config, Engine::new(&runner, &prober, false));

        assert!(!normalizer.can_reuse(&output));
    }

    #[test]
    fn engine_failure_is_reported_with_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = clip_dir(root.path(), "20230101", true);

        let config = CompileConfig::default();
        let runner = RecordingRunner::failing_on("clip.mp4");
        let prober = FakeProber::new();
        let normalizer = ClipNormalizer::new(&config, Engine::new(&runner, &prober, false));

        let err = normalizer.normalize(&dir, false).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("Failed to normalize clip in"));
        assert!(chain.contains("simulated failure"));
    }
}
