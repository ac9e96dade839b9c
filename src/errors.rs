/*!
 * Error types for the slidecast pipeline.
 *
 * This module contains custom error types for the external collaborators
 * (speech synthesizers, media encoders) and for the assembly pipeline itself,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to an external provider
/// (speech synthesis service or media encoder process)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making a request fails
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Error returned by a remote service
    #[error("Service responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// An external program could not be started or exited unsuccessfully
    #[error("{program} failed: {message}")]
    ProcessFailed {
        /// Program name as invoked
        program: String,
        /// Filtered diagnostic output
        message: String,
    },

    /// The provider answered with something unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local file system failure inside the provider
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the video assembly pipeline
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// Malformed or mismatched request shape; raised before any side effect
    #[error("Validation error: {0}")]
    Validation(String),

    /// A caption failed to synthesize
    #[error("Synthesis error at slide {index}: {source}")]
    Synthesis {
        /// Index of the failing slide
        index: usize,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// Image and audio sequences disagree at graph-build time
    #[error("Graph consistency error: {0}")]
    GraphConsistency(String),

    /// The encoder reported failure
    #[error("Encode error: {0}")]
    Encode(String),

    /// Temporary or output directories could not be prepared
    #[error("Workspace error: {0}")]
    Workspace(String),
}

impl AssemblyError {
    /// Short classification tag, stable across messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Synthesis { .. } => "synthesis",
            Self::GraphConsistency(_) => "graph_consistency",
            Self::Encode(_) => "encode",
            Self::Workspace(_) => "workspace",
        }
    }
}

/// Non-fatal failure to remove a temporary workspace.
///
/// Never changes the outcome of a pipeline run; it is only logged.
#[derive(Error, Debug)]
#[error("Failed to remove temporary workspace {path:?}: {message}")]
pub struct CleanupWarning {
    /// Directory that could not be removed
    pub path: PathBuf,
    /// Underlying reason
    pub message: String,
}
