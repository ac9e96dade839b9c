/*!
 * Slideshow assembly pipeline.
 *
 * This module composes the pipeline stages:
 * - `slides`: request model and validation
 * - `synthesis`: concurrent narration of every caption
 * - `graph`: filter graph construction
 * - `encode`: encoder invocation
 * - `assembler`: the facade running the stages in order
 */

pub mod assembler;
pub mod encode;
pub mod graph;
pub mod slides;
pub mod synthesis;

pub use assembler::{AssemblerOptions, PipelinePhase, VideoAssembler};
pub use encode::EncodeDriver;
pub use graph::{Directive, FilterGraph, GraphOptions};
pub use slides::{parse_captions, SlideInput, SlideRequest};
pub use synthesis::{AudioArtifact, SynthesisOrchestrator};
