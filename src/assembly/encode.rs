/*!
 * Encode driver: registers inputs, hands the graph to the encoder and waits
 * for its single terminal result.
 */

use log::{debug, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::AssemblyError;
use crate::providers::{CodecOptions, EncodeInput, EncodeJob, InputKind, MediaEncoder};

use super::graph::FilterGraph;

/// Feeds one assembled request to a media encoder
#[derive(Debug, Clone)]
pub struct EncodeDriver {
    encoder: Arc<dyn MediaEncoder>,
    codec: CodecOptions,
}

impl EncodeDriver {
    pub fn new(encoder: Arc<dyn MediaEncoder>, codec: CodecOptions) -> Self {
        Self { encoder, codec }
    }

    /// Describe the encoder invocation.
    ///
    /// Inputs are interleaved image0, audio0, image1, audio1, ... which is the
    /// stream numbering the filter graph is written against.
    pub fn job<I, A>(&self, images: &[I], audio: &[A], graph: &FilterGraph, destination: &Path) -> EncodeJob
    where
        I: AsRef<Path>,
        A: AsRef<Path>,
    {
        let inputs = images
            .iter()
            .zip(audio)
            .flat_map(|(image, narration)| {
                [
                    EncodeInput {
                        path: image.as_ref().to_path_buf(),
                        kind: InputKind::Image,
                    },
                    EncodeInput {
                        path: narration.as_ref().to_path_buf(),
                        kind: InputKind::Audio,
                    },
                ]
            })
            .collect();

        EncodeJob {
            inputs,
            filter_graph: graph.to_string(),
            output_mappings: graph.output_labels(),
            codec: self.codec.clone(),
            destination: destination.to_path_buf(),
        }
    }

    /// Run the encoder to completion.
    ///
    /// The encoder writes to a staging file next to `destination` which is
    /// renamed into place on success. On failure the staging file is removed
    /// and whatever was already at `destination` is left alone: a partial
    /// encode is never handed back.
    pub async fn drive<I, A>(
        &self,
        images: &[I],
        audio: &[A],
        graph: &FilterGraph,
        destination: &Path,
    ) -> Result<PathBuf, AssemblyError>
    where
        I: AsRef<Path>,
        A: AsRef<Path>,
    {
        if images.len() != audio.len() || images.len() != graph.segment_count() {
            return Err(AssemblyError::GraphConsistency(format!(
                "{} images, {} audio tracks, graph joins {} segments",
                images.len(),
                audio.len(),
                graph.segment_count()
            )));
        }

        let staging = staging_path(destination);
        let job = self.job(images, audio, graph, &staging);
        debug!("Encoding {} inputs into {:?}", job.inputs.len(), staging);

        let encoded = match self.encoder.encode(&job).await {
            Ok(path) => path,
            Err(e) => {
                discard_partial_output(&staging).await;
                return Err(AssemblyError::Encode(e.to_string()));
            }
        };

        if !tokio::fs::try_exists(&encoded).await.unwrap_or(false) {
            discard_partial_output(&staging).await;
            return Err(AssemblyError::Encode(format!(
                "Encoder reported success but {:?} does not exist",
                encoded
            )));
        }

        if let Err(e) = tokio::fs::rename(&encoded, destination).await {
            discard_partial_output(&staging).await;
            return Err(AssemblyError::Encode(format!(
                "Failed to move {:?} to {:?}: {}",
                encoded, destination, e
            )));
        }

        Ok(destination.to_path_buf())
    }
}

/// Hidden sibling of `destination` keeping its extension, unique per call
pub fn staging_path(destination: &Path) -> PathBuf {
    let file_name = destination
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "output.mp4".to_string());
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    destination.with_file_name(format!(".partial-{}-{}", &suffix[..8], file_name))
}

async fn discard_partial_output(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial output {:?}", path),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {:?}: {}", path, e),
    }
}
