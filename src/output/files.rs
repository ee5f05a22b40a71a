//! File-system persistence of a run
//!
//! Layout under the output directory:
//!
//! ```text
//! {dir}/html/{stem}.html
//! {dir}/json/scraped_data_{ts}.json
//! {dir}/csv/documents_{ts}.csv
//! {dir}/csv/articles_{ts}.csv
//! {dir}/summary.json
//! {dir}/summary.md
//! {dir}/logs/scraper.log
//! ```

use crate::output::csv::{write_articles, write_documents};
use crate::output::markdown::generate_markdown_summary;
use crate::output::stats::RunSummary;
use crate::output::traits::{OutputError, OutputHandler, OutputResult, RunResult};
use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Subdirectories created under the output directory
pub const OUTPUT_SUBDIRS: &[&str] = &["html", "json", "csv", "logs"];

/// Name of the persistent log file inside `logs/`
pub const LOG_FILE_NAME: &str = "scraper.log";

/// Creates the output directory and its subdirectories
pub fn create_output_dirs(root: &Path) -> OutputResult<()> {
    for sub in OUTPUT_SUBDIRS {
        let dir = root.join(sub);
        fs::create_dir_all(&dir).map_err(|e| {
            OutputError::Write(format!("cannot create {}: {}", dir.display(), e))
        })?;
    }
    Ok(())
}

/// Path of the persistent log for an output directory
pub fn log_path(root: &Path) -> PathBuf {
    root.join("logs").join(LOG_FILE_NAME)
}

/// Writes snapshots and exports below one output directory
#[derive(Debug, Clone)]
pub struct FileOutput {
    root: PathBuf,
    timestamp: String,
}

impl FileOutput {
    /// Creates the directory layout and stamps exports with the local time
    pub fn prepare(root: impl Into<PathBuf>) -> OutputResult<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::prepare_with_timestamp(root, timestamp)
    }

    /// Same as [`FileOutput::prepare`] with an explicit export timestamp
    pub fn prepare_with_timestamp(
        root: impl Into<PathBuf>,
        timestamp: impl Into<String>,
    ) -> OutputResult<Self> {
        let root = root.into();
        create_output_dirs(&root)?;
        tracing::debug!("Output directory ready: {}", root.display());
        Ok(Self {
            root,
            timestamp: timestamp.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn snapshot_path(&self, stem: &str) -> PathBuf {
        self.root.join("html").join(format!("{}.html", stem))
    }

    pub fn json_path(&self) -> PathBuf {
        self.root
            .join("json")
            .join(format!("scraped_data_{}.json", self.timestamp))
    }

    pub fn documents_csv_path(&self) -> PathBuf {
        self.root
            .join("csv")
            .join(format!("documents_{}.csv", self.timestamp))
    }

    pub fn articles_csv_path(&self) -> PathBuf {
        self.root
            .join("csv")
            .join(format!("articles_{}.csv", self.timestamp))
    }

    pub fn summary_json_path(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    pub fn summary_md_path(&self) -> PathBuf {
        self.root.join("summary.md")
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> OutputResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        tracing::info!("Saved {}", path.display());
        Ok(())
    }
}

impl OutputHandler for FileOutput {
    fn save_snapshot(&self, stem: &str, body: &[u8]) -> OutputResult<PathBuf> {
        let path = self.snapshot_path(stem);
        fs::write(&path, body)?;
        tracing::debug!("Saved HTML snapshot {}", path.display());
        Ok(path)
    }

    fn persist(&self, result: &RunResult, summary: &RunSummary) -> OutputResult<()> {
        self.write_json(&self.json_path(), result)?;

        if !result.documents.is_empty() {
            let path = self.documents_csv_path();
            let mut writer = BufWriter::new(File::create(&path)?);
            write_documents(&mut writer, &result.documents)?;
            writer.flush()?;
            tracing::info!("Saved {} documents to {}", result.documents.len(), path.display());
        }

        if !result.articles.is_empty() {
            let path = self.articles_csv_path();
            let mut writer = BufWriter::new(File::create(&path)?);
            write_articles(&mut writer, &result.articles)?;
            writer.flush()?;
            tracing::info!("Saved {} articles to {}", result.articles.len(), path.display());
        }

        self.write_json(&self.summary_json_path(), summary)?;
        generate_markdown_summary(summary, &self.summary_md_path())?;

        Ok(())
    }
}
