//! Application configuration for EventPages.
//!
//! User config lives at `~/.eventpages/eventpages.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EventPagesError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "eventpages.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".eventpages";

// ---------------------------------------------------------------------------
// Config structs (matching eventpages.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the event feed comes from and how it is fetched.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Where generated pages land.
    #[serde(default)]
    pub output: OutputConfig,

    /// Site identity and external widget identifiers.
    #[serde(default)]
    pub site: SiteConfig,
}

/// `[feed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed location: an `http(s)://` URL, a `file://` URL, or a filesystem path.
    #[serde(default = "default_feed_source")]
    pub source: String,

    /// Maximum number of events rendered per run (first N in feed order).
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a transient fetch failure.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay between retries; multiplied by the attempt number.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source: default_feed_source(),
            max_events: default_max_events(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_feed_source() -> String {
    "https://raw.githubusercontent.com/ALD-Models/Testing/refs/heads/main/events1.json".into()
}
fn default_max_events() -> usize {
    10
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    500
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `<slug>.html` files. Purged at the start of every run.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Sitemap file name, relative to `dir`.
    #[serde(default = "default_sitemap_file")]
    pub sitemap_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            sitemap_file: default_sitemap_file(),
        }
    }
}

fn default_output_dir() -> String {
    "./events".into()
}
fn default_sitemap_file() -> String {
    "sitemap.xml".into()
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Brand name shown in the page header.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Home page the header links to.
    #[serde(default = "default_site_url")]
    pub url: String,

    /// Public URL under which the generated pages are served (sitemap `loc` prefix).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Partner identifier passed to the lodging-search widget.
    #[serde(default = "default_lodging_partner_id")]
    pub lodging_partner_id: String,

    /// Zoom level for the embedded map and lodging widget.
    #[serde(default = "default_map_zoom")]
    pub map_zoom: u8,

    /// Check-in policy: `"today"` or a weekday name (next occurrence, today included).
    #[serde(default = "default_checkin")]
    pub checkin: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            url: default_site_url(),
            base_url: default_base_url(),
            lodging_partner_id: default_lodging_partner_id(),
            map_zoom: default_map_zoom(),
            checkin: default_checkin(),
        }
    }
}

fn default_site_name() -> String {
    "parkrunnertourist".into()
}
fn default_site_url() -> String {
    "https://www.parkrunnertourist.co.uk".into()
}
fn default_base_url() -> String {
    "https://www.parkrunnertourist.co.uk/events".into()
}
fn default_lodging_partner_id() -> String {
    "parkrun".into()
}
fn default_map_zoom() -> u8 {
    13
}
fn default_checkin() -> String {
    "saturday".into()
}

impl AppConfig {
    /// Check the values that would otherwise only fail deep inside a run.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("site.url", &self.site.url), ("site.base_url", &self.site.base_url)] {
            Url::parse(value)
                .map_err(|e| EventPagesError::config(format!("{field} '{value}' is not a valid URL: {e}")))?;
        }

        if self.feed.source.trim().is_empty() {
            return Err(EventPagesError::config("feed.source must not be empty"));
        }
        check_sitemap_file(&self.output.sitemap_file)?;

        Ok(())
    }
}

/// The sitemap name must be a plain file name that cannot collide with a page.
pub fn check_sitemap_file(name: &str) -> Result<()> {
    let trimmed = name.trim();
    let plain = !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !trimmed.contains(['/', '\\']);
    if !plain {
        return Err(EventPagesError::config(format!(
            "output.sitemap_file '{name}' must be a plain file name"
        )));
    }
    if trimmed.to_ascii_lowercase().ends_with(".html") {
        return Err(EventPagesError::config(format!(
            "output.sitemap_file '{name}' would collide with generated pages"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.eventpages/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EventPagesError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.eventpages/eventpages.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| EventPagesError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        EventPagesError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| EventPagesError::io(dir, e))?;
    }

    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EventPagesError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| EventPagesError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}
