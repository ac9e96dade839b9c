/*!
 * Google Translate TTS client.
 *
 * The public `translate_tts` endpoint only accepts short utterances, so captions
 * are split into chunks of at most `MAX_CHUNK_CHARS` characters, each chunk is
 * fetched as MP3, and the frames are concatenated into the destination file.
 */

use async_trait::async_trait;
use bytes::BytesMut;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::SpeechSynthesizer;

/// Longest utterance the endpoint accepts
pub const MAX_CHUNK_CHARS: usize = 100;

// Clauses end on sentence or clause punctuation; the punctuation stays with its clause
static CLAUSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?;:,。！？、]+[.!?;:,。！？、]*").expect("clause pattern is valid"));

/// Google Translate TTS client
#[derive(Debug, Clone)]
pub struct GoogleTts {
    /// HTTP client for API requests
    client: Client,
    /// `translate_tts` endpoint
    endpoint: Url,
    /// Narration language (`tl` parameter)
    language: String,
}

impl GoogleTts {
    /// Create a new client
    pub fn new(endpoint: &str, language: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", endpoint, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            language: language.to_string(),
        })
    }

    /// Fetch one chunk of audio
    async fn fetch_chunk(&self, chunk: &str, idx: usize, total: usize) -> Result<bytes::Bytes, ProviderError> {
        let textlen = chunk.chars().count().to_string();
        let total = total.to_string();
        let idx = idx.to_string();

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", self.language.as_str()),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", "1"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("TTS endpoint error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read audio body: {}", e)))?;
        if body.is_empty() {
            return Err(ProviderError::InvalidResponse("TTS endpoint returned an empty body".to_string()));
        }

        Ok(body)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, destination: &Path) -> Result<PathBuf, ProviderError> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ProviderError::RequestFailed("Nothing to synthesize".to_string()));
        }

        let mut audio = BytesMut::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let body = self.fetch_chunk(chunk, idx, chunks.len()).await?;
            audio.extend_from_slice(&body);
        }

        tokio::fs::write(destination, &audio).await?;
        debug!("Wrote {} bytes of speech ({} chunk(s)) to {:?}", audio.len(), chunks.len(), destination);

        Ok(destination.to_path_buf())
    }

    fn audio_extension(&self) -> &str {
        "mp3"
    }
}

/// Split text into utterances of at most `max_chars` characters.
///
/// Whitespace is collapsed. Clauses are packed greedily; a clause longer than
/// the limit is split on whitespace, and a single word longer than the limit is
/// cut on character boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let mut pieces: Vec<String> = Vec::new();
    for clause in CLAUSE_RE.find_iter(&normalized) {
        let clause = clause.as_str().trim();
        if clause.is_empty() {
            continue;
        }
        if clause.chars().count() <= max_chars {
            pieces.push(clause.to_string());
        } else {
            for word in clause.split(' ') {
                pieces.extend(cut_word(word, max_chars));
            }
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        let needed = if current.is_empty() {
            piece.chars().count()
        } else {
            current.chars().count() + 1 + piece.chars().count()
        };
        if needed <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current = piece;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn cut_word(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
}
