//! Case loading.
//!
//! A dataset is a directory of `*.json` files, one protocol record per file.

use std::fs;
use std::path::{Path, PathBuf};

use dxeval_domain::{CaseError, CaseResult, EvaluationCase, ProtocolRecord};

/// Extension of case files
pub const CASE_FILE_EXTENSION: &str = "json";

/// The dataset directory cannot be used at all
#[derive(Debug, thiserror::Error)]
pub enum DatasetDirError {
    /// Path does not exist
    #[error("Dataset directory '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    /// Path exists but is a file
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Listing failed
    #[error("Failed to read dataset directory '{}': {source}", path.display())]
    Unreadable {
        /// Directory being listed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// List the case files of a dataset directory, sorted by path.
///
/// Only direct children with a `.json` extension are considered.
pub fn discover_case_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetDirError> {
    if !dir.exists() {
        return Err(DatasetDirError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(DatasetDirError::NotADirectory(dir.to_path_buf()));
    }

    let unreadable = |source| DatasetDirError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == CASE_FILE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();

    tracing::debug!(dir = %dir.display(), count = files.len(), "Discovered case files");

    Ok(files)
}

/// Label used for a case file in error reports
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read and validate one case file
pub async fn load_case_file(path: &Path) -> CaseResult<EvaluationCase> {
    let label = file_label(path);
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CaseError::malformed(&label, format!("failed to read file: {}", e)))?;

    parse_case(&bytes, &label)
}

/// Parse and validate one protocol record
pub fn parse_case(bytes: &[u8], label: &str) -> CaseResult<EvaluationCase> {
    let record: ProtocolRecord =
        serde_json::from_slice(bytes).map_err(|e| CaseError::malformed(label, e.to_string()))?;

    EvaluationCase::from_record(record, label)
}
