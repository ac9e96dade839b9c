use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::errors::ProviderError;
use crate::providers::SpeechSynthesizer;

// @module: Offline speech synthesis through the espeak-ng binary

/// espeak-ng process adapter, writes WAV files
#[derive(Debug, Clone)]
pub struct Espeak {
    // @field: Binary to spawn
    command: String,
    // @field: Voice / language code
    voice: String,
}

impl Espeak {
    pub fn new(command: &str, voice: &str) -> Self {
        Self {
            command: command.to_string(),
            voice: voice.to_string(),
        }
    }

    // @returns: Arguments passed to espeak-ng for one caption
    pub fn build_args(&self, text: &str, destination: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            self.voice.clone(),
            "-w".to_string(),
            destination.to_string_lossy().to_string(),
            // Caption after `--` so a leading dash is not read as a flag
            "--".to_string(),
            text.to_string(),
        ]
    }
}

#[async_trait]
impl SpeechSynthesizer for Espeak {
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<PathBuf, ProviderError> {
        let output = Command::new(&self.command)
            .args(self.build_args(text, destination))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProviderError::ProcessFailed {
                program: self.command.clone(),
                message: format!("Failed to execute: {}", e),
            })?;

        if !output.status.success() {
            return Err(ProviderError::ProcessFailed {
                program: self.command.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("espeak-ng wrote {:?}", destination);
        Ok(destination.to_path_buf())
    }

    fn audio_extension(&self) -> &str {
        "wav"
    }
}
