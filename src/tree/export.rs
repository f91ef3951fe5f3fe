use std::fs;
use std::path::{Path, PathBuf};

use super::text_render::render_text_tree;
use crate::types::analysis::SentenceAnalysis;

const STEM_MAX_CHARS: usize = 30;
const EMPTY_STEM: &str = "oracion";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to serialize analysis: {0}")]
    Json(#[from] serde_json::Error),
}

/// First 30 characters of the sentence, lowercased, with everything outside
/// `[a-z0-9]` turned into `_`. Falls back to `oracion` for an empty sentence.
pub fn export_file_stem(full_sentence: &str) -> String {
    let stem: String = full_sentence
        .chars()
        .take(STEM_MAX_CHARS)
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if stem.is_empty() {
        EMPTY_STEM.to_string()
    } else {
        stem
    }
}

/// Downloads folder, then home, then the working directory.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Writes `analisis_<stem>.txt` (the text tree) and `analisis_<stem>.json`
/// into `dir`, returning both paths.
pub fn export_analysis(dir: &Path, analysis: &SentenceAnalysis) -> Result<Vec<PathBuf>, ExportError> {
    let base = format!("analisis_{}", export_file_stem(&analysis.full_sentence));
    let text_path = dir.join(format!("{}.txt", base));
    let json_path = dir.join(format!("{}.json", base));

    let json = serde_json::to_string_pretty(analysis)?;
    write_file(&text_path, &render_text_tree(analysis))?;
    write_file(&json_path, &json)?;
    tracing::info!(path = %text_path.display(), "analysis exported");
    Ok(vec![text_path, json_path])
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|source| ExportError::Io { path: path.to_path_buf(), source })
}
