/*!
 * Mock provider implementations for testing.
 *
 * This module provides doubles for both external collaborators:
 * - `MockSynthesizer::working()` - Always writes a small audio file
 * - `MockSynthesizer::failing_on(..)` - Fails for the listed captions
 * - `MockEncoder::working()` - Records the job and writes a placeholder video
 * - `MockEncoder::failing(..)` - Reports an encoder diagnostic
 */

use async_trait::async_trait;
use rand::Rng;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{EncodeJob, MediaEncoder, SpeechSynthesizer};

/// Behavior mode for the mock synthesizer
#[derive(Debug, Clone, PartialEq)]
pub enum SynthBehavior {
    /// Always succeeds and writes the file
    Working,
    /// Fails for captions in the set, succeeds for the others
    FailingOn(HashSet<String>),
    /// Reports success without writing anything
    NoFile,
}

/// Mock speech synthesizer
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    /// Behavior mode
    behavior: SynthBehavior,
    /// Upper bound of a random per-call delay, in milliseconds
    max_delay_ms: u64,
    /// Extension reported to the pipeline
    extension: String,
    /// Number of calls started
    call_count: Arc<AtomicUsize>,
    /// Captions in completion order
    completed: Arc<Mutex<Vec<String>>>,
}

impl MockSynthesizer {
    /// Create a new mock synthesizer with the specified behavior
    pub fn new(behavior: SynthBehavior) -> Self {
        Self {
            behavior,
            max_delay_ms: 0,
            extension: "mp3".to_string(),
            call_count: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock synthesizer
    pub fn working() -> Self {
        Self::new(SynthBehavior::Working)
    }

    /// Create a mock that fails for the given captions
    pub fn failing_on<I, S>(captions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SynthBehavior::FailingOn(captions.into_iter().map(Into::into).collect()))
    }

    /// Create a mock that claims success but writes nothing
    pub fn without_files() -> Self {
        Self::new(SynthBehavior::NoFile)
    }

    /// Delay every call by a random duration in `0..=max_delay_ms`
    pub fn with_random_delay(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Report a different audio extension
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    /// Number of synthesize calls started so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Captions in the order their synthesis finished
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn random_delay(&self) -> Duration {
        if self.max_delay_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=self.max_delay_ms))
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<PathBuf, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let delay = self.random_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = match &self.behavior {
            SynthBehavior::FailingOn(captions) if captions.contains(text) => Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated synthesis failure for '{}'", text),
            }),
            SynthBehavior::NoFile => Ok(destination.to_path_buf()),
            _ => {
                tokio::fs::write(destination, format!("MOCK-AUDIO:{}", text)).await?;
                Ok(destination.to_path_buf())
            }
        };

        if let Ok(mut completed) = self.completed.lock() {
            completed.push(text.to_string());
        }

        result
    }

    fn audio_extension(&self) -> &str {
        &self.extension
    }
}

/// Behavior mode for the mock encoder
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeBehavior {
    /// Writes a placeholder file at the destination
    Working,
    /// Fails with the given diagnostic, optionally after writing a partial file
    Failing { message: String, write_partial: bool },
    /// Reports success without writing anything
    NoOutput,
}

/// Mock media encoder that records every job it receives
#[derive(Debug, Clone)]
pub struct MockEncoder {
    behavior: EncodeBehavior,
    jobs: Arc<Mutex<Vec<EncodeJob>>>,
}

impl MockEncoder {
    pub fn new(behavior: EncodeBehavior) -> Self {
        Self {
            behavior,
            jobs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(EncodeBehavior::Working)
    }

    pub fn failing(message: &str) -> Self {
        Self::new(EncodeBehavior::Failing {
            message: message.to_string(),
            write_partial: false,
        })
    }

    /// Fail after leaving a truncated file at the destination
    pub fn failing_with_partial_output(message: &str) -> Self {
        Self::new(EncodeBehavior::Failing {
            message: message.to_string(),
            write_partial: true,
        })
    }

    pub fn without_output() -> Self {
        Self::new(EncodeBehavior::NoOutput)
    }

    /// Jobs received so far, in call order
    pub fn jobs(&self) -> Vec<EncodeJob> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MediaEncoder for MockEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<PathBuf, ProviderError> {
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push(job.clone());
        }

        match &self.behavior {
            EncodeBehavior::Working => {
                tokio::fs::write(&job.destination, b"MOCK-VIDEO").await?;
                Ok(job.destination.clone())
            }
            EncodeBehavior::Failing { message, write_partial } => {
                if *write_partial {
                    tokio::fs::write(&job.destination, b"MOCK-PARTIAL").await?;
                }
                Err(ProviderError::ProcessFailed {
                    program: "mock-encoder".to_string(),
                    message: message.clone(),
                })
            }
            EncodeBehavior::NoOutput => Ok(job.destination.clone()),
        }
    }
}
