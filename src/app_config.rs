use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Speech synthesis config
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Encoder config
    #[serde(default)]
    pub encoder: EncoderConfig,

    /// Temporary and output directories
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech synthesis provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProvider {
    // @provider: Google Translate TTS endpoint
    #[default]
    Google,
    // @provider: Local espeak-ng binary
    Espeak,
}

impl SpeechProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google TTS",
            Self::Espeak => "espeak-ng",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Espeak => "espeak".to_string(),
        }
    }
}

impl std::fmt::Display for SpeechProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for SpeechProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "espeak" | "espeak-ng" => Ok(Self::Espeak),
            _ => Err(anyhow!("Invalid speech provider: {}", s)),
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Provider used to narrate captions
    #[serde(default)]
    pub provider: SpeechProvider,

    /// Narration language code (e.g. "fr", "en")
    #[serde(default = "default_language")]
    pub language: String,

    /// Service endpoint URL (Google provider)
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds (Google provider)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional cap on in-flight synthesis calls per request.
    /// When unset every caption is synthesized at once.
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,

    /// Binary to spawn (espeak provider)
    #[serde(default = "default_espeak_command")]
    pub command: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider: SpeechProvider::default(),
            language: default_language(),
            endpoint: default_google_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_requests: None,
            command: default_espeak_command(),
        }
    }
}

/// Encoder configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EncoderConfig {
    /// ffmpeg binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// ffprobe binary, used to measure narration length
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Output video codec
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Output audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Output pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Target frame width
    #[serde(default = "default_width")]
    pub width: u32,

    /// Target frame height
    #[serde(default = "default_height")]
    pub height: u32,

    /// Display aspect ratio as "W/H"
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,

    /// Frame rate used when looping still images
    #[serde(default = "default_framerate")]
    pub framerate: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            pixel_format: default_pixel_format(),
            width: default_width(),
            height: default_height(),
            aspect_ratio: default_aspect_ratio(),
            framerate: default_framerate(),
        }
    }
}

/// Workspace directories
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkspaceConfig {
    /// Parent of per-request temporary directories (system temp dir when unset)
    #[serde(default)]
    pub temp_root: Option<PathBuf>,

    /// Directory receiving finished videos
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            output_dir: default_output_dir(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_google_endpoint() -> String {
    "https://translate.google.com/translate_tts".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_espeak_command() -> String {
    "espeak-ng".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_pixel_format() -> String {
    "yuv420p".to_string()
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_aspect_ratio() -> String {
    "16/9".to_string()
}

fn default_framerate() -> u32 {
    25
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Config {
    /// Load a configuration file, or write the default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        log::warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.speech.language.trim().is_empty() {
            return Err(anyhow!("Speech language must not be empty"));
        }

        if self.speech.provider == SpeechProvider::Google {
            Url::parse(&self.speech.endpoint)
                .with_context(|| format!("Invalid speech endpoint: {}", self.speech.endpoint))?;
        }

        if self.speech.max_concurrent_requests == Some(0) {
            return Err(anyhow!("max_concurrent_requests must be at least 1 when set"));
        }

        let encoder = &self.encoder;
        // libx264 with yuv420p rejects odd dimensions
        if encoder.width == 0 || encoder.height == 0 || encoder.width % 2 != 0 || encoder.height % 2 != 0 {
            return Err(anyhow!(
                "Output resolution must be non-zero and even, got {}x{}",
                encoder.width,
                encoder.height
            ));
        }

        parse_aspect_ratio(&encoder.aspect_ratio)?;

        if encoder.framerate == 0 {
            return Err(anyhow!("Frame rate must be at least 1"));
        }

        for (name, value) in [
            ("video_codec", &encoder.video_codec),
            ("audio_codec", &encoder.audio_codec),
            ("pixel_format", &encoder.pixel_format),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("Encoder option {} must not be empty", name));
            }
        }

        Ok(())
    }
}

/// Parse a "W/H" aspect ratio into its two positive terms
pub fn parse_aspect_ratio(value: &str) -> Result<(u32, u32)> {
    let (w, h) = value
        .split_once('/')
        .ok_or_else(|| anyhow!("Aspect ratio must look like W/H, got {}", value))?;
    let w: u32 = w.trim().parse().with_context(|| format!("Invalid aspect ratio: {}", value))?;
    let h: u32 = h.trim().parse().with_context(|| format!("Invalid aspect ratio: {}", value))?;
    if w == 0 || h == 0 {
        return Err(anyhow!("Aspect ratio terms must be positive, got {}", value));
    }
    Ok((w, h))
}
