use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::image_pipeline::common::error::ConversionError;
use crate::image_pipeline::conversions::FileKind;

/// Replaces every non-ASCII character with `?`.
pub fn ascii_sanitize(text: &str) -> String {
    text.chars().map(|c| if c.is_ascii() { c } else { '?' }).collect()
}

/// True when `count` processed entries should trigger a progress line.
pub fn is_progress_tick(count: usize, interval: usize) -> bool {
    interval > 0 && count > 0 && count % interval == 0
}

pub fn progress_line(count: usize, total: usize, folder: &Path) -> String {
    ascii_sanitize(&format!(
        "Done with Image {} from {} in folder: {}",
        count,
        total,
        folder.display()
    ))
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one folder walk.
#[derive(Debug, Clone)]
pub struct FolderReport {
    pub folder: PathBuf,
    /// Directory entries seen, whether processed or not
    pub entries: usize,
    pub converted_truth: usize,
    pub converted_input: usize,
    /// Entries matching neither marker, or not regular files
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
    /// Progress lines emitted during the walk, in order
    pub progress: Vec<String>,
    pub elapsed: Duration,
}

impl FolderReport {
    pub fn new(folder: impl Into<PathBuf>, entries: usize) -> Self {
        Self {
            folder: folder.into(),
            entries,
            converted_truth: 0,
            converted_input: 0,
            skipped: 0,
            failures: Vec::new(),
            progress: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn converted(&self) -> usize {
        self.converted_truth + self.converted_input
    }

    pub fn record_converted(&mut self, kind: FileKind) {
        match kind {
            FileKind::Truth => self.converted_truth += 1,
            FileKind::Input => self.converted_input += 1,
        }
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, path: impl Into<PathBuf>, error: &ConversionError) {
        self.failures.push(FileFailure {
            path: path.into(),
            error: error.to_string(),
        });
    }

    pub fn log_summary(&self) {
        info!(
            folder = %self.folder.display(),
            truth = self.converted_truth,
            input = self.converted_input,
            skipped = self.skipped,
            failed = self.failures.len(),
            "Folder done in {:.3}s",
            self.elapsed.as_secs_f64()
        );
        for failure in &self.failures {
            warn!("  {}: {}", failure.path.display(), failure.error);
        }
    }
}

/// Outcome of a whole model-list run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub folders: Vec<FolderReport>,
}

impl BatchReport {
    pub fn total_converted(&self) -> usize {
        self.folders.iter().map(FolderReport::converted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.folders.iter().map(|f| f.skipped).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.folders.iter().map(|f| f.failures.len()).sum()
    }

    pub fn total_duration(&self) -> Duration {
        self.folders.iter().map(|f| f.elapsed).sum()
    }

    pub fn log_summary(&self) {
        let total = self.total_duration();
        info!("Batch summary:");
        info!("{:-<72}", "");
        for folder in &self.folders {
            let percentage = if total.as_secs_f64() > 0.0 {
                (folder.elapsed.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            info!(
                "{:<30} {:>6} ok {:>6} skipped {:>4} failed {:>9.3}s ({:>5.1}%)",
                ascii_sanitize(&folder.folder.display().to_string()),
                folder.converted(),
                folder.skipped,
                folder.failures.len(),
                folder.elapsed.as_secs_f64(),
                percentage
            );
        }
        info!("{:-<72}", "");
        info!(
            "{:<30} {:>6} ok {:>6} skipped {:>4} failed {:>9.3}s",
            "Total",
            self.total_converted(),
            self.total_skipped(),
            self.total_failures(),
            total.as_secs_f64()
        );
    }
}
