//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use eventpages_core::{
    CheckinPolicy, GenerateConfig, GenerateResult, ProgressReporter, generate, inspect,
};
use eventpages_feed::{FeedSource, FetchOptions};
use eventpages_shared::{AppConfig, config_file_path, init_config_at, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// EventPages: static accommodation pages for running events.
#[derive(Parser)]
#[command(
    name = "eventpages",
    version,
    about = "Generate one accommodation landing page per event in a feed, plus a sitemap.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.eventpages/eventpages.toml).
    #[arg(long, global = true)]
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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch the feed and regenerate the output directory.
    Generate {
        #[command(flatten)]
        feed: FeedArgs,

        /// Output directory (purged on every run).
        #[arg(short, long, env = "EVENTPAGES_OUT")]
        out: Option<PathBuf>,

        /// Public URL prefix of the generated pages.
        #[arg(long, env = "EVENTPAGES_BASE_URL")]
        base_url: Option<String>,

        /// Check-in date for the lodging widget (YYYY-MM-DD).
        #[arg(long)]
        checkin: Option<NaiveDate>,
    },

    /// Fetch and normalize the feed, print the records as JSON.
    Inspect {
        #[command(flatten)]
        feed: FeedArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Feed selection shared by `generate` and `inspect`.
#[derive(Args, Debug, Default)]
pub(crate) struct FeedArgs {
    /// Feed URL, file:// URL or local path.
    #[arg(long, env = "EVENTPAGES_FEED")]
    pub feed: Option<String>,

    /// Maximum number of events to process.
    #[arg(long, env = "EVENTPAGES_MAX_EVENTS")]
    pub max_events: Option<usize>,
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
        0 => "eventpages=info",
        1 => "eventpages=debug",
        _ => "eventpages=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Generate {
            feed,
            out,
            base_url,
            checkin,
        } => {
            let mut config = resolve_config(config_path)?;
            feed.apply(&mut config);
            if let Some(out) = out {
                config.output.dir = out.to_string_lossy().into_owned();
            }
            if let Some(base_url) = base_url {
                config.site.base_url = base_url;
            }
            config.validate()?;
            cmd_generate(&config, checkin).await
        }
        Command::Inspect { feed } => {
            let mut config = resolve_config(config_path)?;
            feed.apply(&mut config);
            config.validate()?;
            cmd_inspect(&config).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

impl FeedArgs {
    /// Flags and environment win over the config file.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(feed) = &self.feed {
            config.feed.source = feed.clone();
        }
        if let Some(max_events) = self.max_events {
            config.feed.max_events = max_events;
        }
    }
}

/// Load `--config` if given, else the default file (or defaults if absent).
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_generate(config: &AppConfig, checkin: Option<NaiveDate>) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let checkin = resolve_checkin(config, checkin, today)?;

    let generate_config = GenerateConfig::from_app_config(config, checkin, today)?;

    info!(
        feed = %generate_config.feed,
        out = %generate_config.output_dir.display(),
        max_events = generate_config.max_events,
        %checkin,
        "generating event pages"
    );

    let reporter = CliProgress::new();
    let result = generate(&generate_config, &reporter).await?;

    // Print summary
    println!();
    println!("  Event pages generated successfully!");
    println!("  Run:      {}", result.run_id);
    println!("  Pages:    {}", result.pages.len());
    println!("  Check-in: {checkin}");
    println!("  Output:   {}", result.output_dir.display());
    println!("  Sitemap:  {}", result.sitemap.path.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

/// `--checkin` wins, but `site.checkin` is always parsed so a bad value is reported.
fn resolve_checkin(
    config: &AppConfig,
    checkin: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate> {
    let policy: CheckinPolicy = config.site.checkin.parse()?;
    Ok(checkin.unwrap_or_else(|| policy.resolve(today)))
}

async fn cmd_inspect(config: &AppConfig) -> Result<()> {
    let source: FeedSource = config.feed.source.parse()?;
    let events = inspect(&source, &FetchOptions::from(&config.feed), config.feed.max_events).await?;

    let json = serde_json::to_string_pretty(&events).wrap_err("failed to serialize events")?;
    println!("{json}");
    Ok(())
}

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_file_path()?,
    };
    if path.exists() {
        return Err(eyre!("config file already exists at {}", path.display()));
    }

    init_config_at(&path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
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
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_written(&self, slug: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {slug}.html"));
    }

    fn done(&self, _result: &GenerateResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
