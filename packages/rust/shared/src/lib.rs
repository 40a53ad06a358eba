//! Shared types, error model, and configuration for EventPages.
//!
//! This crate is the foundation depended on by all other EventPages crates.
//! It provides:
//! - [`EventPagesError`]: the unified error type
//! - Domain types ([`CanonicalEvent`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FeedConfig, OutputConfig, SiteConfig, check_sitemap_file, config_dir,
    config_file_path, init_config, init_config_at, load_config, load_config_from,
};
pub use error::{EventPagesError, Result};
pub use types::{CanonicalEvent, FALLBACK_LOCATION, FALLBACK_NAME, RunId};
