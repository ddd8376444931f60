//! Depth-first crawl engine.
//!
//! Tasks run one after another. Within a task the engine descends
//! recursively: a node is fetched, extracted and emitted, then each of its
//! children is crawled to completion before the next sibling starts. Depth
//! and the per-task visited registry are the only things that stop a branch.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};
use url::Url;

use sitedoc_shared::{CrawlConfig, CrawlTask, NodeIndex, PageRecord, Result};

use crate::extract::extract;
use crate::fetch::Fetcher;
use crate::visited::VisitedSet;

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Turns one page record into one output document.
///
/// Failures are reported back to the engine, which logs them and carries on.
pub trait DocumentEmitter: Send + Sync {
    /// Write the document for the node at `index`, returning its path.
    fn emit(&self, record: &PageRecord, index: &NodeIndex) -> Result<PathBuf>;
}

/// Progress callback for reporting crawl status.
pub trait CrawlObserver: Send + Sync {
    /// Called before the seed of `task` is visited.
    fn task_started(&self, task: &CrawlTask);
    /// Called after a node's document has been handed to the emitter.
    fn page_emitted(&self, index: &NodeIndex, record: &PageRecord);
    /// Called when every node of a task has been explored.
    fn task_finished(&self, report: &CrawlReport);
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl CrawlObserver for SilentObserver {
    fn task_started(&self, _task: &CrawlTask) {}
    fn page_emitted(&self, _index: &NodeIndex, _record: &PageRecord) {}
    fn task_finished(&self, _report: &CrawlReport) {}
}

// ---------------------------------------------------------------------------
// CrawlReport
// ---------------------------------------------------------------------------

/// Summary of one completed top-level task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// 1-based position of the task in the task file.
    pub task_index: usize,
    pub seed_url: String,
    /// Nodes fetched (or attempted) and handed to the emitter.
    pub pages_visited: usize,
    /// Documents the emitter wrote successfully.
    pub documents_emitted: usize,
    /// Nodes whose record carries an error.
    pub fetch_errors: usize,
    /// Documents the emitter failed to write.
    pub emit_errors: usize,
    /// Visits skipped because of depth or because the URL was already visited.
    pub skipped: usize,
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// CrawlSession
// ---------------------------------------------------------------------------

/// Mutable state of a run, threaded through every recursive call.
///
/// Owns the visited registry and the emitter handle. The registry is reset
/// at the start of every task, so sibling tasks never suppress each other.
pub struct CrawlSession<'a> {
    visited: VisitedSet,
    emitter: &'a dyn DocumentEmitter,
    report: CrawlReport,
}

impl<'a> CrawlSession<'a> {
    pub fn new(emitter: &'a dyn DocumentEmitter) -> Self {
        Self {
            visited: VisitedSet::new(),
            emitter,
            report: CrawlReport::default(),
        }
    }

    /// Prepare for `task`: forget visited URLs and start a fresh report.
    fn begin(&mut self, task: &CrawlTask) {
        self.visited.reset();
        self.report = CrawlReport {
            task_index: task.index,
            seed_url: task.seed_url.clone(),
            ..CrawlReport::default()
        };
    }

    fn finish(&mut self, duration: Duration) -> CrawlReport {
        let mut report = std::mem::take(&mut self.report);
        report.duration = duration;
        report
    }
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Sequential, depth-first crawler.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Fetcher,
}

impl Crawler {
    /// Create a new crawler with the given configuration.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self { config, fetcher })
    }

    /// Crawl every task in order, returning one report per task.
    pub async fn run(
        &self,
        tasks: &[CrawlTask],
        emitter: &dyn DocumentEmitter,
        observer: &dyn CrawlObserver,
    ) -> Vec<CrawlReport> {
        let mut session = CrawlSession::new(emitter);
        let mut reports = Vec::with_capacity(tasks.len());

        info!(tasks = tasks.len(), "starting crawl run");

        for task in tasks {
            reports.push(self.run_task(&mut session, task, observer).await);
            self.throttle().await;
        }

        reports
    }

    /// Crawl a single task from its seed.
    #[instrument(skip_all, fields(task = task.index, seed = %task.seed_url, max_depth = task.max_depth))]
    pub async fn run_task(
        &self,
        session: &mut CrawlSession<'_>,
        task: &CrawlTask,
        observer: &dyn CrawlObserver,
    ) -> CrawlReport {
        let start = Instant::now();
        session.begin(task);
        observer.task_started(task);
        info!("starting task");

        // Key the seed the way link resolution would, so a link back to it matches.
        let seed = Url::parse(&task.seed_url)
            .map(String::from)
            .unwrap_or_else(|_| task.seed_url.clone());

        self.crawl(session, observer, &seed, task.max_depth, 0, &task.root_index())
            .await;

        let report = session.finish(start.elapsed());
        info!(
            pages_visited = report.pages_visited,
            documents = report.documents_emitted,
            fetch_errors = report.fetch_errors,
            emit_errors = report.emit_errors,
            skipped = report.skipped,
            duration_ms = report.duration.as_millis(),
            "task completed"
        );
        observer.task_finished(&report);

        report
    }

    /// Visit `url` as the node `index` at `current_depth`, then its children.
    async fn crawl(
        &self,
        session: &mut CrawlSession<'_>,
        observer: &dyn CrawlObserver,
        url: &str,
        max_depth: u32,
        current_depth: u32,
        index: &NodeIndex,
    ) {
        if current_depth >= max_depth || session.visited.contains(url) {
            debug!(url, %index, current_depth, "skipping");
            session.report.skipped += 1;
            return;
        }

        session.visited.mark_visited(url);
        let record = self.visit(url, &session.visited).await;
        session.report.pages_visited += 1;

        if let Some(error) = &record.error {
            warn!(url, %index, error = %error, "page failed");
            session.report.fetch_errors += 1;
        }

        match session.emitter.emit(&record, index) {
            Ok(path) => {
                info!(%index, path = %path.display(), "document written");
                session.report.documents_emitted += 1;
            }
            Err(e) => {
                warn!(url, %index, error = %e, "failed to write document");
                session.report.emit_errors += 1;
            }
        }
        observer.page_emitted(index, &record);

        if record.is_error() || current_depth + 1 >= max_depth {
            return;
        }

        let limit = self.config.max_children_per_page.unwrap_or(usize::MAX);
        if record.child_urls.len() > limit {
            debug!(
                url,
                found = record.child_urls.len(),
                limit,
                "child links over limit, following the first ones only"
            );
        }

        for (position, child) in record.child_urls.into_iter().take(limit).enumerate() {
            let child_index = index.child(position + 1);
            self.throttle().await;
            Box::pin(self.crawl(
                session,
                observer,
                &child,
                max_depth,
                current_depth + 1,
                &child_index,
            ))
            .await;
        }
    }

    /// Fetch and extract one page; failures become a terminal record.
    async fn visit(&self, url: &str, visited: &VisitedSet) -> PageRecord {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return PageRecord::failed(url, format!("invalid URL: {e}")),
        };

        match self.fetcher.fetch(&parsed).await {
            Ok(body) => extract(&parsed, &body, visited),
            Err(e) => PageRecord::failed(url, e.to_string()),
        }
    }

    async fn throttle(&self) {
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
    }
}
