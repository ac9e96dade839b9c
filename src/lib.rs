/*!
 * # slidecast - narrated slideshow videos from images and captions
 *
 * A Rust library that turns an ordered list of (image, caption) pairs into a
 * single video: every caption is narrated with text-to-speech and its image is
 * shown for the length of that narration.
 *
 * ## Features
 *
 * - Concurrent speech synthesis with index-ordered reassembly
 * - Speech providers:
 *   - Google Translate TTS (HTTP)
 *   - espeak-ng (local)
 * - Deterministic filter graph (scale, label, concat)
 * - ffmpeg encoding with fixed codecs and pixel format
 * - Per-request temporary workspace, always removed
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `assembly`: The pipeline:
 *   - `assembly::slides`: Request model and validation
 *   - `assembly::synthesis`: Concurrent narration
 *   - `assembly::graph`: Filter graph builder
 *   - `assembly::encode`: Encoder driver
 *   - `assembly::assembler`: Facade
 * - `workspace`: Temporary and output directories
 * - `file_utils`: File system operations
 * - `providers`: Speech synthesizer and media encoder implementations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod assembly;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod workspace;

// Re-export main types for easier usage
pub use app_config::Config;
pub use assembly::{parse_captions, FilterGraph, VideoAssembler};
pub use errors::{AssemblyError, CleanupWarning, ProviderError};
pub use workspace::Workspace;
