//! Violation artifact store.
//!
//! Each violation persists one annotated frame as a JPEG under the configured
//! directory (default `violations/`), named by a local timestamp with
//! microsecond precision so names within the same second cannot collide.
//! A failed write is reported, not fatal: the tracker keeps counting.

use std::path::{Path, PathBuf};

use chrono::Local;
use image::{ImageFormat, RgbImage};

use crate::error::PipelineError;

pub const DEFAULT_ARTIFACT_DIR: &str = "violations";

#[derive(Debug)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating the directory if absent.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            PipelineError::Artifact(format!("create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    /// Persist one violation frame, returning the written path.
    pub fn save(&self, frame: &RgbImage) -> Result<PathBuf, PipelineError> {
        let name = format!("violation_{}.jpg", Local::now().format("%Y%m%d_%H%M%S_%6f"));
        let path = self.dir.join(name);
        frame
            .save_with_format(&path, ImageFormat::Jpeg)
            .map_err(|e| PipelineError::Artifact(format!("write {}: {}", path.display(), e)))?;
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
