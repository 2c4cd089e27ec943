//! The encoding profile every artifact shares before concatenation.

pub const TARGET_WIDTH: u32 = 1920;
pub const TARGET_HEIGHT: u32 = 1080;
pub const TARGET_FPS: u32 = 30;
pub const TARGET_SAMPLE_RATE: u32 = 48_000;
pub const VIDEO_CODEC: &str = "libx264";
pub const AUDIO_CODEC: &str = "aac";
pub const PIXEL_FORMAT: &str = "yuv420p";
pub const DEFAULT_VIDEO_BITRATE: &str = "4000k";

pub fn target_size() -> String {
    format!("{TARGET_WIDTH}x{TARGET_HEIGHT}")
}

/// Video encoder arguments for the normalization profile.
#[derive(Debug, Clone)]
pub struct VideoEncodeProfile<'a> {
    pub bitrate: Option<&'a str>,
}

impl VideoEncodeProfile<'_> {
    pub fn push_to(&self, args: &mut Vec<String>) {
        args.push("-c:v".to_string());
        args.push(VIDEO_CODEC.to_string());
        args.push("-r".to_string());
        args.push(TARGET_FPS.to_string());
        if let Some(bitrate) = self.bitrate {
            args.push("-b:v".to_string());
            args.push(bitrate.to_string());
        }
        args.push("-pix_fmt".to_string());
        args.push(PIXEL_FORMAT.to_string());
    }
}

/// What happens to a clip's audio track on the way to the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioPlan {
    /// No audio in the source; a silent lavfi input is mixed in and encoded.
    Synthetic,
    /// Audio already matches the profile and is stream copied.
    Copy,
    /// Audio exists but is re-encoded to AAC at the target sample rate.
    Reencode,
}

impl AudioPlan {
    pub fn push_to(self, args: &mut Vec<String>) {
        args.push("-c:a".to_string());
        match self {
            AudioPlan::Copy => args.push("copy".to_string()),
            AudioPlan::Synthetic => args.push(AUDIO_CODEC.to_string()),
            AudioPlan::Reencode => {
                args.push(AUDIO_CODEC.to_string());
                args.push("-ar".to_string());
                args.push(TARGET_SAMPLE_RATE.to_string());
            }
        }
    }
}
