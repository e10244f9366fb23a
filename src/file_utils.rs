use anyhow::{Context, Result, anyhow};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

/// Sidecar written next to a translated document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslationMetadata {
    pub source_file: String,
    pub output_file: String,
    /// RFC 3339 timestamp of the run
    pub translation_date: String,
    pub user: String,
    pub version: String,
    pub source_language: String,
    pub target_language: String,
    pub pages: usize,
    pub pages_overlaid: usize,
    pub blocks_translated: usize,
}

impl TranslationMetadata {
    // @params: paths of the run, language pair
    pub fn new(source_file: &Path, output_file: &Path, source_language: &str, target_language: &str) -> Self {
        Self {
            source_file: source_file.display().to_string(),
            output_file: output_file.display().to_string(),
            translation_date: Local::now().to_rfc3339(),
            user: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            pages: 0,
            pages_overlaid: 0,
            blocks_translated: 0,
        }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @checks: Input is an existing file with a .pdf extension
    pub fn validate_input_file<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }
        if !path.is_file() {
            return Err(anyhow!("Input path is not a file: {:?}", path));
        }
        let is_pdf = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(anyhow!("Input file is not a PDF: {:?}", path));
        }
        Ok(())
    }

    // @generates: <output_dir>/translated_<stem>.pdf
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(input_file: P1, output_dir: P2) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        output_dir.as_ref().join(format!("translated_{}.pdf", stem))
    }

    // @generates: Sidecar path next to an output document
    pub fn metadata_path<P: AsRef<Path>>(output_file: P) -> PathBuf {
        let output_file = output_file.as_ref();
        let stem = output_file.file_stem().unwrap_or_default().to_string_lossy();
        output_file.with_file_name(format!("{}.meta.json", stem))
    }

    // @generates: Per-run log file path inside `log_dir`
    pub fn log_file_path<P: AsRef<Path>>(log_dir: P) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        log_dir.as_ref().join(format!("translation_{}.log", timestamp))
    }

    /// Write the metadata sidecar as pretty JSON
    pub fn write_metadata<P: AsRef<Path>>(path: P, metadata: &TranslationMetadata) -> Result<()> {
        let content = serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
        Self::write_to_file(path, &content)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
