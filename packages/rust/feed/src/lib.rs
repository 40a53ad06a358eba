//! Event feed retrieval and normalization.
//!
//! The feed is a GeoJSON-like document published by a remote service (or
//! dropped on disk for offline runs). [`fetch`] performs the one network
//! round-trip of a run and returns the parsed payload; [`normalize`] turns it
//! into an ordered, capped batch of [`CanonicalEvent`]s.
//!
//! [`CanonicalEvent`]: eventpages_shared::CanonicalEvent

mod normalize;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use eventpages_shared::{EventPagesError, FeedConfig, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use normalize::{FeedShape, canonicalize, normalize, resolve_shape};

/// Maximum number of redirects to follow when fetching the feed.
const MAX_REDIRECTS: usize = 5;

/// Maximum response size we accept (20 MB).
const MAX_RESPONSE_SIZE: u64 = 20 * 1024 * 1024;

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("EventPages/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// FeedSource
// ---------------------------------------------------------------------------

/// Where the feed payload is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// An `http://` or `https://` URL.
    Remote(Url),
    /// A file on the local filesystem.
    Local(PathBuf),
}

impl FromStr for FeedSource {
    type Err = EventPagesError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EventPagesError::config("feed source must not be empty"));
        }

        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Remote(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Self::Local)
                .map_err(|()| EventPagesError::config(format!("invalid file URL: {s}"))),
            // Single-letter schemes are Windows drive prefixes, not URLs.
            Ok(url) if url.scheme().len() > 1 => Err(EventPagesError::config(format!(
                "unsupported feed scheme '{}' in {s}",
                url.scheme()
            ))),
            _ => Ok(Self::Local(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch options
// ---------------------------------------------------------------------------

/// Timeout and retry settings for remote feeds.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure.
    pub retries: u32,
    /// Base delay between attempts, multiplied by the attempt number.
    pub retry_backoff_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for FetchOptions {
    fn from(config: &FeedConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
            retries: config.retries,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Retrieve the feed and parse it as JSON.
///
/// Remote sources get a request timeout and bounded retry on transport
/// failures and 5xx responses. Client errors and unparseable bodies fail
/// immediately.
#[instrument(skip_all, fields(source = %source))]
pub async fn fetch(source: &FeedSource, opts: &FetchOptions) -> Result<Value> {
    let body = match source {
        FeedSource::Remote(url) => fetch_remote(url, opts).await?,
        FeedSource::Local(path) => {
            info!(path = %path.display(), "reading feed from disk");
            tokio::fs::read(path)
                .await
                .map_err(|e| EventPagesError::io(path, e))?
        }
    };

    debug!(bytes = body.len(), "feed payload received");
    parse_payload(&body)
}

/// Parse raw bytes as a JSON document.
pub fn parse_payload(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body)
        .map_err(|e| EventPagesError::parse(format!("feed is not valid JSON: {e}")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Why a single attempt failed, and whether another attempt may help.
enum AttemptError {
    Transient(String),
    Permanent(String),
}

async fn fetch_remote(url: &Url, opts: &FetchOptions) -> Result<Vec<u8>> {
    let client = build_client(opts)?;
    let mut attempt: u32 = 0;

    info!(%url, "fetching feed");

    loop {
        match fetch_once(&client, url).await {
            Ok(body) => return Ok(body),
            Err(AttemptError::Transient(message)) if attempt < opts.retries => {
                attempt += 1;
                let delay = Duration::from_millis(opts.retry_backoff_ms * u64::from(attempt));
                warn!(
                    attempt,
                    retries = opts.retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "feed fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(AttemptError::Transient(message) | AttemptError::Permanent(message)) => {
                return Err(EventPagesError::Fetch(message));
            }
        }
    }
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &FetchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| EventPagesError::Fetch(format!("failed to build HTTP client: {e}")))
}

async fn fetch_once(client: &Client, url: &Url) -> std::result::Result<Vec<u8>, AttemptError> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| AttemptError::Transient(format!("{url}: {e}")))?;

    let status = response.status();
    if status.is_server_error() {
        return Err(AttemptError::Transient(format!("{url}: HTTP {status}")));
    }
    if !status.is_success() {
        return Err(AttemptError::Permanent(format!("{url}: HTTP {status}")));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_RESPONSE_SIZE {
            return Err(AttemptError::Permanent(format!(
                "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
            )));
        }
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| AttemptError::Transient(format!("{url}: failed to read body: {e}")))?;

    Ok(body.to_vec())
}
