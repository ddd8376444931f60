//! Application configuration for SiteDoc.
//!
//! User config lives at `~/.sitedoc/sitedoc.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteDocError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitedoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitedoc";

/// User-Agent sent with every page request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("SiteDoc/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Config structs (matching sitedoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl behaviour.
    #[serde(default)]
    pub crawl: CrawlSection,

    /// Where and how documents are written.
    #[serde(default)]
    pub output: OutputSection,
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSection {
    /// Pause before every child visit and after every top-level task.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header for page requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum children followed per page; 0 means unbounded.
    #[serde(default = "default_max_children")]
    pub max_children_per_page: usize,
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_children_per_page: default_max_children(),
        }
    }
}

fn default_delay_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_max_children() -> usize {
    100
}

/// Document format written by the emitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    /// File extension used for documents of this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Flat directory all documents of a run are written into.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Document format.
    #[serde(default)]
    pub format: OutputFormat,

    /// File name prefix placed before the node index.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: OutputFormat::default(),
            prefix: default_prefix(),
        }
    }
}

fn default_output_dir() -> String {
    "webs".into()
}
fn default_prefix() -> String {
    "web".into()
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration: merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Fixed throttle between requests.
    pub delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header for page requests.
    pub user_agent: String,
    /// Children followed per page; `None` means unbounded.
    pub max_children_per_page: Option<usize>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        let crawl = &config.crawl;
        Self {
            delay: Duration::from_millis(crawl.delay_ms),
            timeout: Duration::from_secs(crawl.timeout_secs),
            user_agent: crawl.user_agent.clone(),
            max_children_per_page: match crawl.max_children_per_page {
                0 => None,
                n => Some(n),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitedoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteDocError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitedoc/sitedoc.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteDocError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SiteDocError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteDocError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteDocError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteDocError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
