//! Local model discovery.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

const MODEL_EXTENSIONS: &[&str] = &["gguf", "ggml"];

/// Whether an enhanced generation source is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub available: bool,
    /// File name of the detected model, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub message: String,
}

impl ModelStatus {
    pub fn from_model_path(path: Option<&Path>) -> Self {
        match path.and_then(model_file_name) {
            Some(name) => Self {
                available: true,
                message: format!("Local model active: {}", name),
                model_name: Some(name),
            },
            None => Self {
                available: false,
                model_name: None,
                message: "No local model found - using fallback generation".to_string(),
            },
        }
    }
}

pub(crate) fn model_file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

fn is_model_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            MODEL_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Returns the first model file found in the given directories.
///
/// Directories are searched in order; inside a directory, files are taken in
/// name order. Missing or unreadable directories are skipped.
pub fn find_model(directories: &[PathBuf]) -> Option<PathBuf> {
    for dir in directories {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping model directory {}: {}", dir.display(), e);
                continue;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_model_file(path))
            .collect();
        files.sort();

        if let Some(found) = files.into_iter().next() {
            return Some(found);
        }
    }
    None
}
