//! Sitemap generation.
//!
//! Lists every page written in the current run, nothing else:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/events/bushy-park.html</loc>
//!     <lastmod>2026-10-18</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.8</priority>
//!   </url>
//! </urlset>
//! ```

use chrono::NaiveDate;
use eventpages_render::encode;
use tracing::debug;

use crate::writer::PAGE_EXTENSION;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Change frequency advertised for every event page.
pub const CHANGEFREQ: &str = "weekly";

/// Priority advertised for every event page.
pub const PRIORITY: f32 = 0.8;

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: &'static str,
    pub priority: f32,
}

/// The manifest for one run, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sitemap {
    pub entries: Vec<SitemapEntry>,
}

/// Build the manifest from this run's slugs.
pub fn build_sitemap<S: AsRef<str>>(slugs: &[S], base_url: &str, generated_on: NaiveDate) -> Sitemap {
    let entries: Vec<SitemapEntry> = slugs
        .iter()
        .map(|slug| SitemapEntry {
            loc: page_url(base_url, slug.as_ref()),
            lastmod: generated_on,
            changefreq: CHANGEFREQ,
            priority: PRIORITY,
        })
        .collect();

    debug!(entries = entries.len(), "sitemap built");
    Sitemap { entries }
}

/// Public URL of the page for `slug`.
pub fn page_url(base_url: &str, slug: &str) -> String {
    format!(
        "{}/{slug}.{PAGE_EXTENSION}",
        base_url.trim_end_matches('/')
    )
}

impl Sitemap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a sitemaps.org `urlset` document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(128 + self.entries.len() * 160);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in &self.entries {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&encode::text(&entry.loc));
            xml.push_str("</loc>\n    <lastmod>");
            xml.push_str(&entry.lastmod.format("%Y-%m-%d").to_string());
            xml.push_str("</lastmod>\n    <changefreq>");
            xml.push_str(entry.changefreq);
            xml.push_str("</changefreq>\n    <priority>");
            xml.push_str(&format!("{:.1}", entry.priority));
            xml.push_str("</priority>\n  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}
