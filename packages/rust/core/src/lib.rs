//! Pipeline orchestration for EventPages.
//!
//! Ties the feed, render and output stages together into the `generate` run,
//! and owns the pieces only the run needs: the output writer, the sitemap and
//! the check-in date policy.

pub mod checkin;
pub mod pipeline;
pub mod sitemap;
pub mod writer;

pub use checkin::CheckinPolicy;
pub use pipeline::{
    GenerateConfig, GenerateResult, GeneratedPage, ProgressReporter, SilentProgress, generate,
    inspect,
};
pub use sitemap::{Sitemap, SitemapEntry, build_sitemap, page_url};
pub use writer::{OutputWriter, PAGE_EXTENSION, WrittenFile};
