//! Title and end cards: a solid background with a logo, text and fades,
//! plus a silent audio track so they concatenate with the clips.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::common::files::remove_stale_file;
use crate::config::CompileConfig;
use crate::ffmpeg::Engine;
use crate::ffmpeg::filter::{BlankAudio, ColorSource, FilterChain, TextOverlay};
use crate::ffmpeg::profile::{
    AudioPlan, TARGET_FPS, TARGET_HEIGHT, TARGET_WIDTH, VideoEncodeProfile,
};
use crate::ffmpeg::util::path_arg;
use crate::ui::prelude::{Level, emit};

const CENTER_X: &str = "(w-text_w)/2";

const TITLE_LOGO_POSITION: (u32, u32) = (300, 400);
const TITLE_FONT_SIZE: u32 = 70;
const TITLE_TEXT_Y: &str = "(h+text_h+50)/2";
const TITLE_FADE_IN_FRAMES: u32 = 30;

const END_LOGO_POSITION: (u32, u32) = (870, 270);
const END_FONT_SIZE: u32 = 45;
const END_HEADING_Y: &str = "(h-text_h-text_h)/2";
const END_LINE_Y: &str = "(h+text_h)/2";
const END_FADE_IN_FRAMES: u32 = 20;
const END_FADE_OUT_FRAMES: u32 = 30;

const OUTPUT_LABEL: &str = "outv";

/// Inputs: `[0]` background, `[1]` logo, `[2]` silent audio.
struct CardLayout<'a> {
    duration: f64,
    logo: &'a Path,
    logo_position: (u32, u32),
    /// Filters applied after the logo overlay, in order.
    decorations: FilterChain,
}

fn card_args(config: &CompileConfig, layout: CardLayout<'_>, output: &Path) -> Vec<String> {
    let background = ColorSource {
        color: config.background_color.clone(),
        width: TARGET_WIDTH,
        height: TARGET_HEIGHT,
        duration: layout.duration,
        rate: TARGET_FPS,
    };

    let (logo_x, logo_y) = layout.logo_position;
    let mut graph = FilterChain::new();
    graph.push(format!("overlay={logo_x}:{logo_y}"));
    if !layout.decorations.is_empty() {
        graph.push(layout.decorations.join());
    }

    let mut args = vec![
        "-y".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        background.to_filter().compile(),
        "-i".to_string(),
        path_arg(layout.logo),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        BlankAudio::default().to_filter().compile(),
        "-filter_complex".to_string(),
        format!("[0:v][1:v]{}[{OUTPUT_LABEL}]", graph.join()),
        "-map".to_string(),
        format!("[{OUTPUT_LABEL}]"),
        "-map".to_string(),
        "2:a".to_string(),
        "-shortest".to_string(),
    ];

    VideoEncodeProfile { bitrate: None }.push_to(&mut args);
    AudioPlan::Reencode.push_to(&mut args);
    args.push(path_arg(output));
    args
}

/// Title card showing the covered date range under the logo.
pub fn build_title_card_args(
    config: &CompileConfig,
    date_range: &str,
    output: &Path,
) -> Result<Vec<String>> {
    let font = config.font_file()?;
    let logo = config.title_logo()?;

    let mut decorations = FilterChain::new();
    decorations
        .push_filter(
            &TextOverlay::new(date_range, CENTER_X, TITLE_TEXT_Y)
                .font_size(TITLE_FONT_SIZE)
                .to_filter(&font),
        )
        .push(format!("fade=in:0:{TITLE_FADE_IN_FRAMES}"));

    Ok(card_args(
        config,
        CardLayout {
            duration: config.title_duration(),
            logo: &logo,
            logo_position: TITLE_LOGO_POSITION,
            decorations,
        },
        output,
    ))
}

/// Frame at which the end card starts fading out.
pub fn fade_out_start(duration: f64) -> u32 {
    let total_frames = (duration * f64::from(TARGET_FPS)).floor() as u32;
    total_frames.saturating_sub(END_FADE_OUT_FRAMES)
}

/// End card with two centered credit lines, fading in and out.
pub fn build_end_card_args(config: &CompileConfig, output: &Path) -> Result<Vec<String>> {
    let font = config.font_file()?;
    let logo = config.end_logo()?;
    let duration = config.end_duration();

    let mut decorations = FilterChain::new();
    decorations
        .push_filter(
            &TextOverlay::new(&config.credits_heading, CENTER_X, END_HEADING_Y)
                .font_size(END_FONT_SIZE)
                .to_filter(&font),
        )
        .push_filter(
            &TextOverlay::new(&config.credits_line, CENTER_X, END_LINE_Y)
                .font_size(END_FONT_SIZE)
                .to_filter(&font),
        )
        .push(format!("fade=in:0:{END_FADE_IN_FRAMES}"))
        .push(format!(
            "fade=out:{}:{END_FADE_OUT_FRAMES}",
            fade_out_start(duration)
        ));

    Ok(card_args(
        config,
        CardLayout {
            duration,
            logo: &logo,
            logo_position: END_LOGO_POSITION,
            decorations,
        },
        output,
    ))
}

pub struct CardBuilder<'a> {
    config: &'a CompileConfig,
    engine: Engine<'a>,
}

impl<'a> CardBuilder<'a> {
    pub fn new(config: &'a CompileConfig, engine: Engine<'a>) -> Self {
        Self { config, engine }
    }

    /// Always rebuilt so the range matches the current set of clips.
    pub fn build_title(&self, work_dir: &Path, date_range: &str) -> Result<PathBuf> {
        let output = work_dir.join(&self.config.title_file_name);
        emit(
            Level::Info,
            "card.title",
            "Creating title video...",
            Some(serde_json::json!({ "range": date_range })),
        );

        remove_stale_file(&output)?;
        let args = build_title_card_args(self.config, date_range, &output)?;
        self.engine
            .run(&args, "rendering title card")
            .context("Failed to create title video")?;
        Ok(output)
    }

    pub fn build_end(&self, work_dir: &Path) -> Result<PathBuf> {
        let output = work_dir.join(&self.config.end_file_name);
        emit(Level::Info, "card.end", "Creating ending video...", None);

        remove_stale_file(&output)?;
        let args = build_end_card_args(self.config, &output)?;
        self.engine
            .run(&args, "rendering end card")
            .context("Failed to create ending video")?;
        Ok(output)
    }
}
