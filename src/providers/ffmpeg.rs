/*!
 * ffmpeg encoder adapter.
 *
 * Images are registered as looped still inputs held for the length of the
 * narration that follows them (measured with ffprobe), then the filter graph
 * is applied and the mapped labels are encoded to the destination.
 */

use async_trait::async_trait;
use log::{debug, error};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::app_config::EncoderConfig;
use crate::errors::ProviderError;
use crate::providers::{EncodeJob, InputKind, MediaEncoder};

/// ffmpeg/ffprobe process adapter
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    /// ffmpeg binary
    ffmpeg_path: String,
    /// ffprobe binary
    ffprobe_path: String,
    /// Frame rate of looped stills
    framerate: u32,
}

impl FfmpegEncoder {
    /// Create an encoder from configuration
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            framerate: config.framerate,
        }
    }

    /// Measure the duration of a media file in seconds
    pub async fn probe_duration(&self, path: &Path) -> Result<f64, ProviderError> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProviderError::ProcessFailed {
                program: self.ffprobe_path.clone(),
                message: format!("Failed to execute: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed on {:?}: {}", path, stderr);
            return Err(ProviderError::ProcessFailed {
                program: self.ffprobe_path.clone(),
                message: stderr.trim().to_string(),
            });
        }

        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }

    /// Hold time for every input: `Some(seconds)` for an image followed by its
    /// narration, `None` otherwise
    async fn hold_times(&self, job: &EncodeJob) -> Result<Vec<Option<f64>>, ProviderError> {
        let mut holds = vec![None; job.inputs.len()];
        for (position, input) in job.inputs.iter().enumerate() {
            if input.kind != InputKind::Image {
                continue;
            }
            if let Some(next) = job.inputs.get(position + 1) {
                if next.kind == InputKind::Audio {
                    holds[position] = Some(self.probe_duration(&next.path).await?);
                }
            }
        }
        Ok(holds)
    }

    /// Full ffmpeg argument list for a job
    pub fn build_args(&self, job: &EncodeJob, holds: &[Option<f64>]) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into(), "-hide_banner".into()];

        for (position, input) in job.inputs.iter().enumerate() {
            if input.kind == InputKind::Image {
                args.extend(["-loop".into(), "1".into(), "-framerate".into(), self.framerate.to_string()]);
                if let Some(Some(seconds)) = holds.get(position) {
                    args.extend(["-t".into(), format!("{:.3}", seconds)]);
                }
            }
            args.extend(["-i".into(), input.path.to_string_lossy().to_string()]);
        }

        args.extend(["-filter_complex".into(), job.filter_graph.clone()]);
        for label in &job.output_mappings {
            args.extend(["-map".into(), label.clone()]);
        }
        args.extend([
            "-c:v".into(),
            job.codec.video_codec.clone(),
            "-c:a".into(),
            job.codec.audio_codec.clone(),
            "-pix_fmt".into(),
            job.codec.pixel_format.clone(),
        ]);
        args.push(job.destination.to_string_lossy().to_string());

        args
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<PathBuf, ProviderError> {
        let holds = self.hold_times(job).await?;
        let args = self.build_args(job, &holds);
        debug!("Running {} {}", self.ffmpeg_path, args.join(" "));

        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProviderError::ProcessFailed {
                program: self.ffmpeg_path.clone(),
                message: format!("Failed to execute: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::ProcessFailed {
                program: self.ffmpeg_path.clone(),
                message: filter_ffmpeg_stderr(&stderr),
            });
        }

        Ok(job.destination.clone())
    }
}

/// Read `format.duration` from ffprobe JSON output
pub fn parse_probe_duration(stdout: &str) -> Result<f64, ProviderError> {
    let json: Value = serde_json::from_str(stdout)
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse ffprobe JSON output: {}", e)))?;

    let duration = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| ProviderError::InvalidResponse("ffprobe output has no format duration".to_string()))?;

    if !duration.is_finite() || duration <= 0.0 {
        return Err(ProviderError::InvalidResponse(format!("Unusable media duration: {}", duration)));
    }

    Ok(duration)
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "encoder",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "frame=",
        "size=",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
