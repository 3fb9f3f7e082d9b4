//! Hand the encoded workbook to the filesystem.

use std::path::Path;

use tracing::info;

use crate::ExportError;

/// File name used when the caller does not choose one.
pub const DEFAULT_FILE_NAME: &str = "loteria.xlsx";

/// Write `bytes` to `path`, replacing any existing file.
pub async fn save(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), bytes = bytes.len(), "saved workbook");
    Ok(())
}
