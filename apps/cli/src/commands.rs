//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use sitedoc_crawler::{CrawlObserver, CrawlReport, Crawler};
use sitedoc_render::FileEmitter;
use sitedoc_shared::{
    AppConfig, CrawlConfig, CrawlTask, DEFAULT_TASKS_FILE, NodeIndex, OutputFormat, PageRecord,
    init_config, load_config, load_config_from, load_tasks, resolve_tasks, write_example_tasks,
};
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SiteDoc: crawl sites to a bounded depth and write one document per page.
#[derive(Parser)]
#[command(
    name = "sitedoc",
    version,
    about = "Crawl configured sites to a bounded depth and write one document per page.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.sitedoc/sitedoc.toml.
    #[arg(long, global = true, env = "SITEDOC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Document format flag.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum FormatArg {
    Markdown,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl every task in the task file.
    Run(RunArgs),

    /// Write an example task file.
    Init {
        /// Where to write the task file.
        #[arg(long, default_value = DEFAULT_TASKS_FILE)]
        tasks: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `sitedoc run`; each overrides the matching config value.
#[derive(Args)]
pub(crate) struct RunArgs {
    /// JSON task file: `[{"url": "...", "depth": 2}, ...]`.
    #[arg(long, default_value = DEFAULT_TASKS_FILE)]
    pub tasks: PathBuf,

    /// Output directory for documents.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Document format.
    #[arg(short, long)]
    pub format: Option<FormatArg>,

    /// Delay in milliseconds before each child visit and after each task.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Maximum children followed per page (0 = unbounded).
    #[arg(long)]
    pub max_children: Option<usize>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sitedoc=info",
        1 => "sitedoc=debug",
        _ => "sitedoc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Run(args) => cmd_run(config_path.as_deref(), &args).await,
        Command::Init { tasks } => cmd_init(&tasks),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

/// Apply `run` flags on top of the loaded config.
fn apply_overrides(config: &mut AppConfig, args: &RunArgs) {
    if let Some(out) = &args.out {
        config.output.dir = out.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format.into();
    }
    if let Some(delay_ms) = args.delay_ms {
        config.crawl.delay_ms = delay_ms;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.crawl.timeout_secs = timeout_secs;
    }
    if let Some(max_children) = args.max_children {
        config.crawl.max_children_per_page = max_children;
    }
}

/// Load the task file, reporting problems without failing the process.
fn read_tasks(path: &Path) -> Vec<CrawlTask> {
    match load_tasks(path) {
        Ok(Some(entries)) => resolve_tasks(&entries),
        Ok(None) => {
            warn!(path = %path.display(), "task file not found");
            println!(
                "No task file at {}. Run `sitedoc init --tasks {}` to create an example.",
                path.display(),
                path.display()
            );
            Vec::new()
        }
        Err(e) => {
            error!(error = %e, "could not read task file");
            Vec::new()
        }
    }
}

async fn cmd_run(config_path: Option<&Path>, args: &RunArgs) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    apply_overrides(&mut config, args);

    let tasks = read_tasks(&args.tasks);
    if tasks.is_empty() {
        info!("no tasks to run");
        return Ok(());
    }

    let crawler = Crawler::new(CrawlConfig::from(&config))?;
    let emitter = FileEmitter::from_config(&config.output);

    info!(
        tasks = tasks.len(),
        out = %emitter.dir().display(),
        format = ?config.output.format,
        "starting crawl"
    );

    let reporter = CliProgress::new();
    let reports = crawler.run(&tasks, &emitter, &reporter).await;
    reporter.finish();

    print_summary(&reports, &emitter);
    Ok(())
}

fn print_summary(reports: &[CrawlReport], emitter: &FileEmitter) {
    println!();
    for report in reports {
        println!(
            "  [{}] {}: {} documents, {} failed pages, {} write errors ({:.1}s)",
            report.task_index,
            report.seed_url,
            report.documents_emitted,
            report.fetch_errors,
            report.emit_errors,
            report.duration.as_secs_f64()
        );
    }
    let total: usize = reports.iter().map(|r| r.documents_emitted).sum();
    println!();
    println!("  Documents: {total}");
    println!("  Output:    {}", emitter.dir().display());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl CrawlObserver for CliProgress {
    fn task_started(&self, task: &CrawlTask) {
        self.spinner.set_message(format!(
            "Task {} (depth {}): {}",
            task.index, task.max_depth, task.seed_url
        ));
    }

    fn page_emitted(&self, index: &NodeIndex, record: &PageRecord) {
        let status = if record.is_error() { "failed" } else { "ok" };
        self.spinner
            .set_message(format!("[{index}] {status} {}", record.url));
    }

    fn task_finished(&self, report: &CrawlReport) {
        self.spinner.println(format!(
            "Task {} done: {} documents",
            report.task_index, report.documents_emitted
        ));
    }
}

fn cmd_init(tasks: &Path) -> Result<()> {
    write_example_tasks(tasks).map_err(|e| eyre!("could not create task file: {e}"))?;
    println!("Example task file created at: {}", tasks.display());
    println!("Edit it with your URLs and run `sitedoc run`.");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
