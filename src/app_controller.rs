use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::document::extract::{FragmentSource, LopdfExtractor};
use crate::document::merge::PageMerger;
use crate::document::pdf::PdfDocument;
use crate::file_utils::{FileManager, TranslationMetadata};
use crate::language_utils::ScriptProfile;
use crate::overlay::font::OverlayFont;
use crate::page_processor::{PageOutcome, PageProcessor, PageReport};
use crate::translation::{TextTranslator, TranslationService};

// @module: Application controller for document translation

/// Summary of one translated document
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub pages: usize,
    pub pages_overlaid: usize,
    pub pages_unchanged: usize,
    pub pages_failed: usize,
    pub blocks_translated: usize,
    pub blocks_dropped: usize,
    pub output_path: PathBuf,
    pub page_reports: Vec<PageReport>,
}

impl DocumentReport {
    fn new(output_path: PathBuf) -> Self {
        Self {
            pages: 0,
            pages_overlaid: 0,
            pages_unchanged: 0,
            pages_failed: 0,
            blocks_translated: 0,
            blocks_dropped: 0,
            output_path,
            page_reports: Vec::new(),
        }
    }

    fn record(&mut self, page: PageReport) {
        self.pages += 1;
        match page.outcome {
            PageOutcome::Overlaid { .. } => self.pages_overlaid += 1,
            PageOutcome::Unchanged { .. } => self.pages_unchanged += 1,
            PageOutcome::Failed { .. } => self.pages_failed += 1,
        }
        self.blocks_translated += page.translated;
        self.blocks_dropped += page.dropped;
        self.page_reports.push(page);
    }
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one PDF with the configured provider.
    ///
    /// Returns `None` when the output already exists and `force_overwrite` is off.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<Option<DocumentReport>> {
        FileManager::validate_input_file(&input_file)?;

        let service = TranslationService::new(self.config.translation.clone())
            .context("Failed to create translation service")?;
        if let Err(e) = service.test_connection().await {
            warn!("Translation provider {} is not reachable: {}", self.config.translation.provider, e);
        }

        self.run_with(&service, &LopdfExtractor::new(), &input_file, &output_dir, force_overwrite)
            .await
    }

    /// Translate one PDF with an explicit translator and fragment source
    pub async fn run_with<T, S>(
        &self,
        translator: &T,
        source: &S,
        input_file: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<Option<DocumentReport>>
    where
        T: TextTranslator + ?Sized,
        S: FragmentSource + ?Sized,
    {
        let start_time = std::time::Instant::now();

        FileManager::validate_input_file(input_file)?;
        FileManager::ensure_dir(output_dir)?;

        let output_path = FileManager::generate_output_path(input_file, output_dir);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(None);
        }

        let mut doc = PdfDocument::load(input_file)?;
        let page_count = doc.page_count();
        info!("Translating {} pages of {}", page_count, input_file.display());

        let font = OverlayFont::discover(&self.config.fonts.search_paths);
        if !font.is_embedded() && ScriptProfile::for_language(&self.config.target_language).is_rtl() {
            warn!("No TrueType font found, right-to-left text will not render correctly");
        }
        let mut merger = PageMerger::new(font);
        let processor = PageProcessor::new(&self.config, translator, source);

        let progress_bar = ProgressBar::new(page_count as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let mut report = DocumentReport::new(output_path.clone());
        for page_index in 0..page_count {
            progress_bar.set_message(format!("page {}", page_index + 1));
            let page_report = processor.process_page(&mut doc, &mut merger, page_index).await;
            debug!("Page {}: {:?}", page_index + 1, page_report.outcome);
            report.record(page_report);
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        doc.save(&output_path)?;

        if self.config.output.write_metadata {
            let mut metadata = TranslationMetadata::new(
                input_file,
                &output_path,
                &self.config.source_language,
                &self.config.target_language,
            );
            metadata.pages = report.pages;
            metadata.pages_overlaid = report.pages_overlaid;
            metadata.blocks_translated = report.blocks_translated;
            if let Err(e) = FileManager::write_metadata(FileManager::metadata_path(&output_path), &metadata) {
                warn!("Failed to write metadata: {}", e);
            }
        }

        info!(
            "{} of {} pages overlaid, {} blocks translated, {} dropped",
            report.pages_overlaid, report.pages, report.blocks_translated, report.blocks_dropped
        );
        if report.pages_failed > 0 {
            warn!("{} pages failed and were kept unchanged", report.pages_failed);
        }
        info!("Success: {} ({})", output_path.display(), Self::format_duration(start_time.elapsed()));

        Ok(Some(report))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
