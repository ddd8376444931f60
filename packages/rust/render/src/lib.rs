//! Document rendering and file output.
//!
//! [`FileEmitter`] is the [`DocumentEmitter`] used by the CLI: it renders each
//! page record as Markdown or JSON and writes it as `<prefix><node>.<ext>`
//! into one flat output directory.

mod json;
mod markdown;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tracing::{debug, instrument};

use sitedoc_crawler::DocumentEmitter;
use sitedoc_shared::{NodeIndex, OutputFormat, OutputSection, PageRecord, Result, SiteDocError};

pub use json::render_json;
pub use markdown::render_markdown;

/// Writes one rendered document per node into a flat directory.
///
/// The directory is created on the first emission, not at construction, so a
/// run that emits nothing leaves no trace on disk.
#[derive(Debug)]
pub struct FileEmitter {
    dir: PathBuf,
    prefix: String,
    format: OutputFormat,
    dir_ready: AtomicBool,
}

impl FileEmitter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            format,
            dir_ready: AtomicBool::new(false),
        }
    }

    /// Build an emitter from the `[output]` config section.
    pub fn from_config(output: &OutputSection) -> Self {
        Self::new(&output.dir, &output.prefix, output.format)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for the node at `index`.
    pub fn document_path(&self, index: &NodeIndex) -> PathBuf {
        self.dir.join(format!(
            "{}{index}.{}",
            self.prefix,
            self.format.extension()
        ))
    }

    /// Render `record` in this emitter's format.
    pub fn render(&self, record: &PageRecord, index: &NodeIndex) -> Result<String> {
        let now = Utc::now();
        match self.format {
            OutputFormat::Markdown => Ok(render_markdown(record, index, now)),
            OutputFormat::Json => render_json(record, index, now),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        if self.dir_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| SiteDocError::io(&self.dir, e))?;
        if !self.dir_ready.swap(true, Ordering::AcqRel) {
            debug!(dir = %self.dir.display(), "created output directory");
        }
        Ok(())
    }
}

impl DocumentEmitter for FileEmitter {
    #[instrument(skip_all, fields(node = %index, url = %record.url))]
    fn emit(&self, record: &PageRecord, index: &NodeIndex) -> Result<PathBuf> {
        let body = self.render(record, index)?;
        self.ensure_dir()?;

        let path = self.document_path(index);
        std::fs::write(&path, body).map_err(|e| SiteDocError::io(&path, e))?;
        Ok(path)
    }
}
