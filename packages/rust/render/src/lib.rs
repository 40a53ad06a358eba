//! Slugs, output encoding, and HTML page rendering for EventPages.
//!
//! - [`slug`]: name to URL-safe identifier, plus per-batch collision handling
//! - [`encode`]: the only two functions that move feed data into markup
//! - [`page`]: the event landing page template

pub mod encode;
pub mod page;
pub mod slug;

pub use page::{DEFAULT_DESCRIPTION_LIMIT, RenderConfig, keywords, render_page, truncate_chars};
pub use slug::{EMPTY_SLUG_FALLBACK, SlugRegistry, slugify};
