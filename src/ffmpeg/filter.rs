//! Filter expressions in ffmpeg's `name=arg:arg` syntax.
//!
//! A [`Filter`] is a plain value. The prebuilt variants below ([`TextOverlay`],
//! [`BlankAudio`], [`ColorSource`]) are small configuration structs that
//! produce a `Filter` when asked; there is no shared instance between builders.

use std::path::Path;

use super::util::{drawtext_text_value, filter_path_value};

/// One named ffmpeg filter with positional, colon separated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    name: String,
    args: Vec<String>,
}

impl Filter {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Render as `name=arg1:arg2:...`. Arguments are not escaped; callers are
    /// responsible for producing text that is valid in the filter grammar.
    pub fn compile(&self) -> String {
        format!("{}={}", self.name, self.args.join(":"))
    }
}

/// Filters joined into a single linear chain (`a,b,c`).
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<String>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, filter: impl Into<String>) -> &mut Self {
        self.filters.push(filter.into());
        self
    }

    pub fn push_filter(&mut self, filter: &Filter) -> &mut Self {
        self.push(filter.compile())
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn join(&self) -> String {
        self.filters.join(",")
    }
}

pub const DEFAULT_FONT_SIZE: u32 = 45;
const TEXT_COLOR: &str = "white";
const SHADOW_OFFSET: i32 = 2;
const SHADOW_COLOR: &str = "DarkSlateGray";

/// White text with a drop shadow, drawn with the bundled font.
#[derive(Debug, Clone)]
pub struct TextOverlay {
    pub text: String,
    pub x: String,
    pub y: String,
    pub font_size: u32,
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self {
            text: String::new(),
            x: "0".to_string(),
            y: "0".to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl TextOverlay {
    pub fn new(text: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: x.into(),
            y: y.into(),
            ..Self::default()
        }
    }

    pub fn font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    /// `x` and `y` are forwarded untouched so they may hold drawtext
    /// expressions such as `(w-text_w)/2`.
    pub fn to_filter(&self, font_file: &Path) -> Filter {
        Filter::new(
            "drawtext",
            [
                format!("text={}", drawtext_text_value(&self.text)),
                format!("fontfile={}", filter_path_value(font_file)),
                format!("fontsize={}", self.font_size),
                format!("fontcolor={TEXT_COLOR}"),
                format!("shadowx={SHADOW_OFFSET}"),
                format!("shadowy={SHADOW_OFFSET}"),
                format!("shadowcolor={SHADOW_COLOR}"),
                format!("x={}", self.x),
                format!("y={}", self.y),
            ],
        )
    }
}

pub const DEFAULT_CHANNEL_LAYOUT: &str = "stereo";
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Unbounded silent audio, used as a lavfi input.
#[derive(Debug, Clone)]
pub struct BlankAudio {
    pub channel_layout: String,
    pub sample_rate: u32,
}

impl Default for BlankAudio {
    fn default() -> Self {
        Self {
            channel_layout: DEFAULT_CHANNEL_LAYOUT.to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl BlankAudio {
    pub fn to_filter(&self) -> Filter {
        Filter::new(
            "anullsrc",
            [
                format!("channel_layout={}", self.channel_layout),
                format!("sample_rate={}", self.sample_rate),
            ],
        )
    }
}

/// Solid color video source of a fixed length.
#[derive(Debug, Clone)]
pub struct ColorSource {
    pub color: String,
    pub width: u32,
    pub height: u32,
    pub duration: f64,
    pub rate: u32,
}

impl ColorSource {
    pub fn to_filter(&self) -> Filter {
        Filter::new(
            "color",
            [
                format!("c={}", self.color),
                format!("s={}x{}", self.width, self.height),
                format!("d={}", self.duration),
                format!("rate={}", self.rate),
            ],
        )
    }
}
