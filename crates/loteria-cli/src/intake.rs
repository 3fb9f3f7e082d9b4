//! Intake buffer: the ordered list of ticket photos for one processing cycle.

use std::path::{Path, PathBuf};

use loteria_ai::{ImageFile, media_type_for};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("{}: not an accepted image type (png, gif, jpeg, jpg)", path.display())]
    Unsupported { path: PathBuf },
    #[error("{}: not a regular file", path.display())]
    NotAFile { path: PathBuf },
    #[error("{}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct IntakeBuffer {
    files: Vec<ImageFile>,
}

impl IntakeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `path` if it is an existing image file. Duplicates are kept.
    pub async fn add(&mut self, path: &Path) -> Result<&ImageFile, IntakeError> {
        let mime_type = media_type_for(path).ok_or_else(|| IntakeError::Unsupported {
            path: path.to_path_buf(),
        })?;
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|source| IntakeError::Metadata {
                path: path.to_path_buf(),
                source,
            })?;
        if !meta.is_file() {
            return Err(IntakeError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), size = meta.len(), "accepted image");
        self.files.push(ImageFile::new(path, meta.len(), mime_type));
        Ok(&self.files[self.files.len() - 1])
    }

    /// Add every path in order, returning the rejections.
    pub async fn add_all<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<IntakeError> {
        let mut rejected = Vec::new();
        for path in paths {
            if let Err(e) = self.add(path.as_ref()).await {
                rejected.push(e);
            }
        }
        rejected
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `name - size bytes`, one entry per accepted file.
    pub fn listing(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|f| format!("{} - {} bytes", f.name, f.size))
            .collect()
    }
}
