/*!
 * Fan-out narration of every caption.
 *
 * All captions are synthesized concurrently (optionally capped), each into its
 * own index-named file of the workspace. Results are collected keyed by slide
 * index and returned in slide order, whatever order they completed in.
 *
 * The first failure ends the batch: captions not yet started are skipped and
 * calls already in flight are awaited, so nothing is written into the
 * workspace once `synthesize_all` has returned.
 */

use futures::stream::{self, StreamExt};
use log::debug;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{AssemblyError, ProviderError};
use crate::providers::SpeechSynthesizer;
use crate::workspace::Workspace;

use super::slides::SlideRequest;

/// Narration produced for one slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub index: usize,
    pub path: PathBuf,
}

/// Drives one synthesizer over all captions of a request
#[derive(Debug, Clone)]
pub struct SynthesisOrchestrator {
    /// The synthesizer to use
    synthesizer: Arc<dyn SpeechSynthesizer>,

    /// Maximum number of concurrent calls, all captions at once when `None`
    max_concurrent_requests: Option<usize>,
}

impl SynthesisOrchestrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, max_concurrent_requests: Option<usize>) -> Self {
        Self {
            synthesizer,
            max_concurrent_requests,
        }
    }

    /// Synthesize every caption of `request` into `workspace`.
    ///
    /// Returns exactly one artifact per slide, `artifacts[i].index == i`.
    pub async fn synthesize_all(
        &self,
        request: &SlideRequest,
        workspace: &Workspace,
        request_id: &str,
    ) -> Result<Vec<AudioArtifact>, AssemblyError> {
        let total = request.len();
        let limit = self.max_concurrent_requests.unwrap_or(total).clamp(1, total.max(1));
        let extension = self.synthesizer.audio_extension().to_string();
        let aborted = Arc::new(AtomicBool::new(false));

        // Tasks own their inputs; nothing borrowed from the request crosses an await
        let tasks: Vec<_> = request
            .slides()
            .iter()
            .enumerate()
            .map(|(index, slide)| {
                let synthesizer = Arc::clone(&self.synthesizer);
                let caption = slide.caption_text.clone();
                let destination = workspace.audio_path(index, &extension);
                let request_id = request_id.to_string();
                let aborted = Arc::clone(&aborted);
                async move {
                    if aborted.load(Ordering::SeqCst) {
                        return (index, None);
                    }
                    let start_time = Instant::now();
                    let result = synthesizer.synthesize(&caption, &destination).await;
                    debug!(
                        "[{}] Slide {} narration finished in {:?} ({})",
                        request_id,
                        index,
                        start_time.elapsed(),
                        if result.is_ok() { "ok" } else { "failed" }
                    );
                    (index, Some(result))
                }
            })
            .collect();

        let mut pending = stream::iter(tasks).buffer_unordered(limit);
        let mut artifacts = Vec::with_capacity(total);
        let mut first_error: Option<AssemblyError> = None;

        // Drain the whole stream: skipped tasks finish at once, in-flight ones run out
        while let Some((index, outcome)) = pending.next().await {
            let Some(result) = outcome else { continue };
            if first_error.is_some() {
                continue;
            }
            match settle(index, result).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    aborted.store(true, Ordering::SeqCst);
                    first_error = Some(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        // Sort results by slide index to restore input order
        artifacts.sort_by_key(|artifact| artifact.index);

        let aligned = artifacts.len() == total && artifacts.iter().enumerate().all(|(i, a)| a.index == i);
        if !aligned {
            return Err(AssemblyError::GraphConsistency(format!(
                "Expected {} narrations, collected {}",
                total,
                artifacts.len()
            )));
        }

        Ok(artifacts)
    }
}

/// Turn one synthesizer result into an artifact whose file exists
async fn settle(index: usize, result: Result<PathBuf, ProviderError>) -> Result<AudioArtifact, AssemblyError> {
    let path = result.map_err(|source| AssemblyError::Synthesis { index, source })?;

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(AssemblyError::Synthesis {
            index,
            source: ProviderError::InvalidResponse(format!(
                "Synthesizer reported success but {:?} does not exist",
                path
            )),
        });
    }

    Ok(AudioArtifact { index, path })
}
