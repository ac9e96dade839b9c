/*!
 * Video assembly facade.
 *
 * The single entry point of the pipeline:
 * 1. Validating: request shape, before any side effect
 * 2. Synthesizing: workspace creation and concurrent narration
 * 3. GraphBuilding: pure filter graph construction
 * 4. Encoding: one encoder run
 *
 * The temporary workspace is removed on every exit path once it exists.
 * Each state transition is logged once, prefixed with the request id.
 */

use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::errors::{AssemblyError, ProviderError};
use crate::providers::ffmpeg::FfmpegEncoder;
use crate::providers::{self, CodecOptions, MediaEncoder, SpeechSynthesizer};
use crate::workspace::Workspace;

use super::encode::EncodeDriver;
use super::graph::{FilterGraph, GraphOptions};
use super::slides::SlideRequest;
use super::synthesis::SynthesisOrchestrator;

/// States of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    Validating,
    Synthesizing,
    GraphBuilding,
    Encoding,
    Done,
    Failed,
}

impl PipelinePhase {
    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Tunables of the facade that are not owned by a provider
#[derive(Debug, Clone, Default)]
pub struct AssemblerOptions {
    /// Parent of per-request temporary directories
    pub temp_root: Option<PathBuf>,

    /// Target frame geometry
    pub graph: GraphOptions,

    /// Output codecs
    pub codec: CodecOptions,

    /// Cap on concurrent synthesis calls per request
    pub max_concurrent_synthesis: Option<usize>,
}

impl From<&Config> for AssemblerOptions {
    fn from(config: &Config) -> Self {
        Self {
            temp_root: config.workspace.temp_root.clone(),
            graph: GraphOptions {
                width: config.encoder.width,
                height: config.encoder.height,
                aspect_ratio: config.encoder.aspect_ratio.clone(),
            },
            codec: CodecOptions {
                video_codec: config.encoder.video_codec.clone(),
                audio_codec: config.encoder.audio_codec.clone(),
                pixel_format: config.encoder.pixel_format.clone(),
            },
            max_concurrent_synthesis: config.speech.max_concurrent_requests,
        }
    }
}

/// Bookkeeping and event stream of one run
#[derive(Debug)]
struct PipelineRun {
    request_id: String,
    phase: PipelinePhase,
    start_time: Instant,
}

impl PipelineRun {
    fn new() -> Self {
        let request_id = uuid::Uuid::new_v4().simple().to_string()[..12].to_string();
        Self {
            request_id,
            phase: PipelinePhase::Idle,
            start_time: Instant::now(),
        }
    }

    fn transition(&mut self, next: PipelinePhase) {
        info!("[{}] {:?} -> {:?}", self.request_id, self.phase, next);
        self.phase = next;
    }

    fn fail(&mut self, error: AssemblyError) -> AssemblyError {
        error!(
            "[{}] {:?} -> Failed after {:?} ({}): {}",
            self.request_id,
            self.phase,
            self.start_time.elapsed(),
            error.kind(),
            error
        );
        self.phase = PipelinePhase::Failed;
        error
    }
}

/// Turns ordered (image, caption) pairs into one narrated slideshow video
#[derive(Debug, Clone)]
pub struct VideoAssembler {
    orchestrator: SynthesisOrchestrator,
    driver: EncodeDriver,
    graph_options: GraphOptions,
    temp_root: Option<PathBuf>,
}

impl VideoAssembler {
    /// Create an assembler over explicit collaborators
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        encoder: Arc<dyn MediaEncoder>,
        options: AssemblerOptions,
    ) -> Self {
        Self {
            orchestrator: SynthesisOrchestrator::new(synthesizer, options.max_concurrent_synthesis),
            driver: EncodeDriver::new(encoder, options.codec),
            graph_options: options.graph,
            temp_root: options.temp_root,
        }
    }

    /// Create an assembler with the providers selected by the configuration
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let synthesizer = providers::create_synthesizer(&config.speech)?;
        let encoder: Arc<dyn MediaEncoder> = Arc::new(FfmpegEncoder::new(&config.encoder));
        Ok(Self::new(synthesizer, encoder, AssemblerOptions::from(config)))
    }

    /// Build the video for `images[i]` narrated by `texts[i]` at `output_path`.
    ///
    /// On success the file exists at the returned path. On success or failure
    /// no temporary file of this run remains.
    pub async fn create_video(
        &self,
        images: Vec<PathBuf>,
        texts: Vec<String>,
        output_path: &Path,
    ) -> Result<PathBuf, AssemblyError> {
        let mut run = PipelineRun::new();

        run.transition(PipelinePhase::Validating);
        let request = match SlideRequest::new(images, texts) {
            Ok(request) => request,
            Err(e) => return Err(run.fail(e)),
        };
        info!("[{}] {} slide(s) -> {:?}", run.request_id, request.len(), output_path);

        run.transition(PipelinePhase::Synthesizing);
        let output_dir = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let workspace = match Workspace::create(self.temp_root.as_deref(), output_dir, &run.request_id) {
            Ok(workspace) => workspace,
            Err(e) => return Err(run.fail(e)),
        };

        let outcome = self.run_stages(&mut run, &request, &workspace, output_path).await;

        if let Err(warning) = workspace.close() {
            warn!("[{}] {}", run.request_id, warning);
        }

        match outcome {
            Ok(path) => {
                run.transition(PipelinePhase::Done);
                info!("[{}] Video ready in {:?}: {:?}", run.request_id, run.start_time.elapsed(), path);
                Ok(path)
            }
            Err(e) => Err(run.fail(e)),
        }
    }

    async fn run_stages(
        &self,
        run: &mut PipelineRun,
        request: &SlideRequest,
        workspace: &Workspace,
        output_path: &Path,
    ) -> Result<PathBuf, AssemblyError> {
        let artifacts = self
            .orchestrator
            .synthesize_all(request, workspace, &run.request_id)
            .await?;

        run.transition(PipelinePhase::GraphBuilding);
        let images = request.image_paths();
        let audio: Vec<PathBuf> = artifacts.into_iter().map(|artifact| artifact.path).collect();
        let graph = FilterGraph::build(&images, &audio, &self.graph_options)?;

        run.transition(PipelinePhase::Encoding);
        self.driver.drive(&images, &audio, &graph, output_path).await
    }
}
