/*!
 * Filter graph construction.
 *
 * Input streams are registered interleaved (image0, audio0, image1, audio1, ...),
 * so the image of slide `i` is stream `2i` and its narration is stream `2i + 1`.
 * Each image is scaled to the target frame and labeled `v{i}`, each narration
 * is passed through as `a{i}`, and one concat joins all pairs into `[v][a]`.
 * A single slide still goes through a one-segment concat.
 */

use std::fmt;
use std::path::Path;

use crate::app_config::parse_aspect_ratio;
use crate::errors::AssemblyError;

/// Label of the concatenated video stream
pub const VIDEO_OUTPUT_LABEL: &str = "[v]";

/// Label of the concatenated audio stream
pub const AUDIO_OUTPUT_LABEL: &str = "[a]";

/// Target frame geometry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    pub width: u32,
    pub height: u32,
    /// Display aspect ratio as "W/H"
    pub aspect_ratio: String,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            aspect_ratio: "16/9".to_string(),
        }
    }
}

/// One filter chain of the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Scale a still image stream and tag it
    Scale {
        stream: usize,
        width: u32,
        height: u32,
        aspect_ratio: String,
        label: String,
    },
    /// Pass a narration stream through unchanged and tag it
    AudioPassthrough { stream: usize, label: String },
    /// Join `(video, audio)` label pairs in order
    Concat { segments: Vec<(String, String)> },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale { stream, width, height, aspect_ratio, label } => {
                write!(f, "[{}:v]scale={}:{},setdar={}[{}]", stream, width, height, aspect_ratio, label)
            }
            Self::AudioPassthrough { stream, label } => write!(f, "[{}:a]anull[{}]", stream, label),
            Self::Concat { segments } => {
                for (video, audio) in segments {
                    write!(f, "[{}][{}]", video, audio)?;
                }
                write!(
                    f,
                    "concat=n={}:v=1:a=1{}{}",
                    segments.len(),
                    VIDEO_OUTPUT_LABEL,
                    AUDIO_OUTPUT_LABEL
                )
            }
        }
    }
}

/// Complete graph for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGraph {
    directives: Vec<Directive>,
}

impl FilterGraph {
    /// Build the graph for index-aligned image and audio paths.
    ///
    /// Only the number of slides shapes the text; the paths are taken to check
    /// that both sequences describe the same slides. A mismatch means the
    /// synthesis stage broke its contract.
    pub fn build<I, A>(images: &[I], audio: &[A], options: &GraphOptions) -> Result<Self, AssemblyError>
    where
        I: AsRef<Path>,
        A: AsRef<Path>,
    {
        if images.len() != audio.len() {
            return Err(AssemblyError::GraphConsistency(format!(
                "{} images but {} audio tracks",
                images.len(),
                audio.len()
            )));
        }
        if images.is_empty() {
            return Err(AssemblyError::GraphConsistency("Cannot build a graph without slides".to_string()));
        }

        let (dar_width, dar_height) = parse_aspect_ratio(&options.aspect_ratio)
            .map_err(|e| AssemblyError::Validation(format!("{:#}", e)))?;
        let aspect_ratio = format!("{}/{}", dar_width, dar_height);

        let count = images.len();
        let mut directives = Vec::with_capacity(2 * count + 1);
        let mut segments = Vec::with_capacity(count);

        for index in 0..count {
            let video_label = format!("v{}", index);
            let audio_label = format!("a{}", index);

            directives.push(Directive::Scale {
                stream: index * 2,
                width: options.width,
                height: options.height,
                aspect_ratio: aspect_ratio.clone(),
                label: video_label.clone(),
            });
            directives.push(Directive::AudioPassthrough {
                stream: index * 2 + 1,
                label: audio_label.clone(),
            });
            segments.push((video_label, audio_label));
        }

        directives.push(Directive::Concat { segments });

        Ok(Self { directives })
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Number of slides joined by the concat
    pub fn segment_count(&self) -> usize {
        self.directives
            .iter()
            .find_map(|d| match d {
                Directive::Concat { segments } => Some(segments.len()),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Labels mapped to the encoder output
    pub fn output_labels(&self) -> Vec<String> {
        vec![VIDEO_OUTPUT_LABEL.to_string(), AUDIO_OUTPUT_LABEL.to_string()]
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, directive) in self.directives.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", directive)?;
        }
        Ok(())
    }
}
