/*!
 * Per-request workspace management.
 *
 * A `Workspace` owns one exclusive temporary directory holding the audio
 * artifacts of a single pipeline run, and refers to the shared output
 * directory. The temporary directory is removed by `close`; if a workspace is
 * dropped without being closed (panic, early return) the directory is still
 * removed, silently.
 */

use log::debug;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};

use crate::errors::{AssemblyError, CleanupWarning};
use crate::file_utils::FileManager;

/// Temporary and output directories of one request
#[derive(Debug)]
pub struct Workspace {
    /// Owned temporary directory, `None` once closed
    temp_dir: Option<TempDir>,
    /// Path of the temporary directory, kept for reporting after close
    temp_path: PathBuf,
    /// Shared output directory
    output_dir: PathBuf,
}

impl Workspace {
    /// Create the request's temporary directory and make sure the output
    /// directory exists.
    ///
    /// The temporary directory is named after the request id plus a random
    /// suffix, under `temp_root` or the system temp dir.
    pub fn create(temp_root: Option<&Path>, output_dir: &Path, request_id: &str) -> Result<Self, AssemblyError> {
        let prefix = format!("slidecast-{}-", request_id);
        let mut builder = Builder::new();
        builder.prefix(&prefix);

        let temp_dir = match temp_root {
            Some(root) => {
                FileManager::ensure_dir(root).map_err(|e| AssemblyError::Workspace(format!("{:#}", e)))?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| AssemblyError::Workspace(format!("Failed to create temporary directory: {}", e)))?;

        FileManager::ensure_dir(output_dir).map_err(|e| AssemblyError::Workspace(format!("{:#}", e)))?;

        let temp_path = temp_dir.path().to_path_buf();
        debug!("Workspace ready: temp {:?}, output {:?}", temp_path, output_dir);

        Ok(Self {
            temp_dir: Some(temp_dir),
            temp_path,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Temporary directory of this request
    pub fn temp_dir(&self) -> &Path {
        &self.temp_path
    }

    /// Shared output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Deterministic location of the narration for slide `index`
    pub fn audio_path(&self, index: usize, extension: &str) -> PathBuf {
        self.temp_path.join(format!("audio{}.{}", index, extension))
    }

    /// Remove the temporary directory and everything in it.
    ///
    /// Failure is reported as a warning for the caller to log; it never
    /// changes a pipeline outcome.
    pub fn close(mut self) -> Result<(), CleanupWarning> {
        match self.temp_dir.take() {
            Some(dir) => dir.close().map_err(|e| CleanupWarning {
                path: self.temp_path.clone(),
                message: e.to_string(),
            }),
            None => Ok(()),
        }
    }
}
