/*!
 * Request model: ordered (image, caption) pairs.
 *
 * Index `i` always means "image `i` narrated by caption `i`". A `SlideRequest`
 * can only be built from inputs that passed validation, so everything
 * downstream may rely on `N >= 1` and equal lengths.
 */

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::errors::AssemblyError;
use crate::file_utils::FileManager;

/// One image and the caption narrated over it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideInput {
    pub image_path: PathBuf,
    pub caption_text: String,
}

/// Validated, immutable request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRequest {
    slides: Vec<SlideInput>,
}

impl SlideRequest {
    /// Pair images with captions after checking the request shape.
    ///
    /// Rejects an empty request, mismatched counts, missing image files and
    /// blank captions. Touches nothing on disk besides existence checks.
    pub fn new(images: Vec<PathBuf>, texts: Vec<String>) -> Result<Self, AssemblyError> {
        if images.is_empty() {
            return Err(AssemblyError::Validation("No images provided".to_string()));
        }

        if images.len() != texts.len() {
            return Err(AssemblyError::Validation(format!(
                "Text array length must match images ({} images, {} texts)",
                images.len(),
                texts.len()
            )));
        }

        for (index, image) in images.iter().enumerate() {
            if !FileManager::file_exists(image) {
                return Err(AssemblyError::Validation(format!(
                    "Image at index {} does not exist: {:?}",
                    index, image
                )));
            }
        }

        if let Some(index) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(AssemblyError::Validation(format!("Caption at index {} is empty", index)));
        }

        let slides = images
            .into_iter()
            .zip(texts)
            .map(|(image_path, caption_text)| SlideInput { image_path, caption_text })
            .collect();

        Ok(Self { slides })
    }

    pub fn slides(&self) -> &[SlideInput] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false for a validated request
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Image paths in slide order
    pub fn image_paths(&self) -> Vec<&Path> {
        self.slides.iter().map(|s| s.image_path.as_path()).collect()
    }
}

/// Decode the caption payload sent alongside the images.
///
/// The payload must be a JSON array whose elements are all strings.
pub fn parse_captions(payload: &str) -> Result<Vec<String>, AssemblyError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| AssemblyError::Validation(format!("Caption payload is not valid JSON: {}", e)))?;

    let items = value
        .as_array()
        .ok_or_else(|| AssemblyError::Validation("Caption payload must be a JSON array".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                AssemblyError::Validation(format!("Caption at index {} is not a string", index))
            })
        })
        .collect()
}
