/*!
 * Provider implementations for the external collaborators of the pipeline.
 *
 * The pipeline treats speech synthesis and media encoding as opaque services
 * behind two capability traits:
 * - `SpeechSynthesizer`: text -> audio file
 * - `MediaEncoder`: ordered inputs + filter graph -> video file
 *
 * Implementations:
 * - `google_tts`: Google Translate TTS over HTTP
 * - `espeak`: local espeak-ng process
 * - `ffmpeg`: local ffmpeg/ffprobe processes
 * - `mock`: scripted doubles for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{SpeechConfig, SpeechProvider};
use crate::errors::ProviderError;

pub mod espeak;
pub mod ffmpeg;
pub mod google_tts;
pub mod mock;

/// Text-to-speech capability.
///
/// One call per caption; calls are independent and may run concurrently.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize `text` into an audio file at `destination`
    ///
    /// # Returns
    /// * `Result<PathBuf, ProviderError>` - The written file path or an error
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<PathBuf, ProviderError>;

    /// Extension of the audio files this synthesizer writes
    fn audio_extension(&self) -> &str;
}

/// Transcoding capability.
///
/// `encode` resolves exactly once, after the encoder reached a terminal state.
#[async_trait]
pub trait MediaEncoder: Send + Sync + Debug {
    /// Run the job to completion
    ///
    /// # Returns
    /// * `Result<PathBuf, ProviderError>` - The destination path or the encoder's diagnostic
    async fn encode(&self, job: &EncodeJob) -> Result<PathBuf, ProviderError>;
}

/// What an encoder input stream carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Still image, one video stream
    Image,
    /// Narration, one audio stream
    Audio,
}

/// One registered encoder input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeInput {
    pub path: PathBuf,
    pub kind: InputKind,
}

/// Codec settings fixed on the single output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    pub video_codec: String,
    pub audio_codec: String,
    pub pixel_format: String,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            pixel_format: "yuv420p".to_string(),
        }
    }
}

/// Everything an encoder needs for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeJob {
    /// Inputs in registration order; stream `i` of the graph is `inputs[i]`
    pub inputs: Vec<EncodeInput>,
    /// Filter graph description
    pub filter_graph: String,
    /// Graph labels mapped to the output, e.g. `[v]`, `[a]`
    pub output_mappings: Vec<String>,
    pub codec: CodecOptions,
    pub destination: PathBuf,
}

impl EncodeJob {
    /// Input paths in registration order
    pub fn input_paths(&self) -> Vec<&Path> {
        self.inputs.iter().map(|input| input.path.as_path()).collect()
    }
}

/// Build the synthesizer selected by the configuration
pub fn create_synthesizer(config: &SpeechConfig) -> Result<Arc<dyn SpeechSynthesizer>, ProviderError> {
    match config.provider {
        SpeechProvider::Google => {
            let synthesizer = google_tts::GoogleTts::new(
                &config.endpoint,
                &config.language,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(synthesizer))
        }
        SpeechProvider::Espeak => Ok(Arc::new(espeak::Espeak::new(&config.command, &config.language))),
    }
}
