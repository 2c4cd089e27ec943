//! Orchestrates a full compilation run in one working directory.


use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use crate::cards::CardBuilder;
use crate::clip::{ClipNormalizer, ClipOutcome};
use crate::common::files::remove_stale_file;
use crate::config::CompileConfig;
use crate::dates::{DateEntry, date_range};
use crate::ffmpeg::Engine;
use crate::manifest::{build_concat_args, write_manifest};
use crate::scan::discover_date_dirs;
use crate::ui::prelude::{Level, emit};

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub work_dir: PathBuf,
    pub reuse_outputs: bool,
}

#[derive(Debug, Clone)]
pub struct CompileReport {
    pub date_range: String,
    pub final_video: PathBuf,
    pub manifest: PathBuf,
    /// Everything that went into the manifest, in order.
    pub artifacts: Vec<PathBuf>,
    pub reused: Vec<String>,
    /// Date directories without a source clip.
    pub skipped: Vec<String>,
    pub elapsed: Duration,
}

pub fn run_compilation(
    config: &CompileConfig,
    engine: Engine<'_>,
    options: &CompileOptions,
) -> Result<CompileReport> {
    let started = Instant::now();
    let work_dir = options.work_dir.as_path();

    let dirs = discover_date_dirs(work_dir)?;
    let entries: Vec<DateEntry> = dirs.iter().map(|dir| dir.entry.clone()).collect();
    let Some(range) = date_range(&entries) else {
        bail!(
            "No date directories (YYYYMMDD or YYYY-MM-DD) found in {}",
            work_dir.display()
        );
    };

    emit(
        Level::Info,
        "compile.start",
        &format!(
            "Creating 1SE for range: {}. Total Videos: {}",
            range,
            dirs.len()
        ),
        Some(serde_json::json!({ "range": range, "directories": dirs.len() })),
    );

    let cards = CardBuilder::new(config, engine);
    let normalizer = ClipNormalizer::new(config, engine);

    let mut artifacts = vec![cards.build_title(work_dir, &range)?];
    let mut reused = Vec::new();
    let mut skipped = Vec::new();

    for dir in &dirs {
        let outcome = normalizer.normalize(dir, options.reuse_outputs)?;
        match &outcome {
            ClipOutcome::MissingSource => skipped.push(dir.name().to_string()),
            ClipOutcome::Reused(_) => reused.push(dir.name().to_string()),
            ClipOutcome::Built { .. } => {}
        }
        if let Some(path) = outcome.artifact() {
            artifacts.push(path.to_path_buf());
        }
    }

    artifacts.push(cards.build_end(work_dir)?);

    let manifest = work_dir.join(&config.manifest_name);
    write_manifest(&manifest, &artifacts)?;

    let final_video = work_dir.join(&config.final_video_name);
    concatenate(engine, &manifest, &final_video)?;

    Ok(CompileReport {
        date_range: range,
        final_video,
        manifest,
        artifacts,
        reused,
        skipped,
        elapsed: started.elapsed(),
    })
}

impl CompileReport {
    /// Normalized clips in the final video, without the two cards.
    pub fn clip_count(&self) -> usize {
        self.artifacts.len().saturating_sub(2)
    }
}

fn concatenate(engine: Engine<'_>, manifest: &Path, final_video: &Path) -> Result<()> {
    emit(Level::Info, "compile.concat", "constructing video...", None);
    remove_stale_file(final_video)?;
    engine
        .run(&build_concat_args(manifest, final_video), "concatenating")
        .with_context(|| format!("Failed to concatenate clips into {}", final_video.display()))
}
