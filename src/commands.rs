use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::{Commands, CompileArgs, DatesArgs, ProbeArgs};
use crate::compile::{CompileOptions, CompileReport, run_compilation};
use crate::config::CompileConfig;
use crate::dates::{DateEntry, date_range};
use crate::deps::{REQUIRED_TOOLS, ensure_tools};
use crate::ffmpeg::probe::{is_audio_normalized, is_video_at_30fps};
use crate::ffmpeg::{Engine, StreamKind, StreamProber, SystemFfmpegRunner, SystemStreamProber};
use crate::scan::discover_date_dirs;
use crate::ui::prelude::{Level, emit};

pub fn handle_command(command: Option<Commands>) -> Result<()> {
    match command {
        None => handle_compile(CompileArgs::default()),
        Some(Commands::Compile(args)) => handle_compile(args),
        Some(Commands::Dates(args)) => handle_dates(args),
        Some(Commands::Probe(args)) => handle_probe(args),
    }
}

fn resolve_work_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve directory {}", dir.display())),
        None => env::current_dir().context("Failed to determine the current directory"),
    }
}

fn handle_compile(args: CompileArgs) -> Result<()> {
    let work_dir = resolve_work_dir(args.dir.clone())?;
    let config = CompileConfig::load(args.config.as_deref(), &work_dir)?;
    config.ensure_resources()?;
    ensure_tools(REQUIRED_TOOLS)?;

    let reuse_outputs = args.reuse_override().unwrap_or(config.reuse_outputs);
    let runner = SystemFfmpegRunner;
    let prober = SystemStreamProber;
    let engine = Engine::new(&runner, &prober, args.verbose);

    let report = run_compilation(
        &config,
        engine,
        &CompileOptions {
            work_dir,
            reuse_outputs,
        },
    )?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &CompileReport) {
    if !report.reused.is_empty() {
        emit(
            Level::Info,
            "compile.reused",
            &format!("Reused existing output for: {}", report.reused.join(", ")),
            Some(serde_json::json!({ "dirs": report.reused })),
        );
    }
    if !report.skipped.is_empty() {
        emit(
            Level::Warn,
            "compile.skipped",
            &format!("No clip found, left out: {}", report.skipped.join(", ")),
            Some(serde_json::json!({ "dirs": report.skipped })),
        );
    }

    let seconds = report.elapsed.as_secs_f64();
    emit(
        Level::Success,
        "compile.done",
        &format!(
            "Done! Total Time: {:.3}s. {} clips covering {} written to {}",
            seconds,
            report.clip_count(),
            report.date_range,
            report.final_video.display()
        ),
        Some(serde_json::json!({
            "output": report.final_video.display().to_string(),
            "manifest": report.manifest.display().to_string(),
            "range": report.date_range,
            "clips": report.clip_count(),
            "seconds": seconds,
        })),
    );
}

fn handle_dates(args: DatesArgs) -> Result<()> {
    let work_dir = resolve_work_dir(args.dir)?;
    let config = CompileConfig::load(args.config.as_deref(), &work_dir)?;
    let dirs = discover_date_dirs(&work_dir)?;

    if dirs.is_empty() {
        emit(
            Level::Warn,
            "dates.none",
            &format!("No date directories found in {}", work_dir.display()),
            None,
        );
        return Ok(());
    }

    for dir in &dirs {
        let has_clip = dir.path.join(&config.clip_file_name).exists();
        let marker = if has_clip { "✓" } else { "✗" };
        emit(
            Level::Info,
            "dates.entry",
            &format!("{marker} {:<12} {}", dir.name(), dir.display_date()),
            Some(serde_json::json!({
                "dir": dir.name(),
                "date": dir.display_date(),
                "has_clip": has_clip,
            })),
        );
    }

    let entries: Vec<DateEntry> = dirs.iter().map(|dir| dir.entry.clone()).collect();
    if let Some(range) = date_range(&entries) {
        emit(
            Level::Success,
            "dates.range",
            &format!("Range: {} ({} directories)", range, dirs.len()),
            Some(serde_json::json!({ "range": range, "directories": dirs.len() })),
        );
    }
    Ok(())
}

fn handle_probe(args: ProbeArgs) -> Result<()> {
    ensure_tools(&[&crate::deps::FFPROBE])?;
    if !args.file.exists() {
        anyhow::bail!("{} does not exist", args.file.display());
    }
    report_streams(&SystemStreamProber, &args.file);
    Ok(())
}

fn report_streams(prober: &dyn StreamProber, file: &Path) {
    let audio = prober.first_stream(file, StreamKind::Audio);
    let video = prober.first_stream(file, StreamKind::Video);

    match &audio {
        Some(stream) => emit(
            Level::Info,
            "probe.audio",
            &format!(
                "audio: {} time_base={} sample_rate={} normalized={}",
                stream.codec_name.as_deref().unwrap_or("?"),
                stream.codec_time_base.as_deref().unwrap_or("?"),
                stream.sample_rate.as_deref().unwrap_or("?"),
                is_audio_normalized(stream)
            ),
            None,
        ),
        None => emit(Level::Warn, "probe.audio", "audio: none", None),
    }

    match &video {
        Some(stream) => emit(
            Level::Info,
            "probe.video",
            &format!(
                "video: {} {}x{} avg_frame_rate={} at_30fps={}",
                stream.codec_name.as_deref().unwrap_or("?"),
                stream.width.unwrap_or_default(),
                stream.height.unwrap_or_default(),
                stream.avg_frame_rate.as_deref().unwrap_or("?"),
                is_video_at_30fps(stream)
            ),
            None,
        ),
        None => emit(Level::Warn, "probe.video", "video: none", None),
    }
}
