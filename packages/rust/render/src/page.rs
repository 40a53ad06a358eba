//! Event landing page renderer.
//!
//! [`render_page`] is a pure function of the event, the check-in date and the
//! [`RenderConfig`]. It never reads the clock or the environment, so rendering
//! the same inputs twice yields byte-identical documents.

use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::{Days, NaiveDate};
use eventpages_shared::{AppConfig, CanonicalEvent};
use tracing::instrument;

use crate::encode;

/// Stylesheet inlined into every page.
const STYLESHEET: &str = include_str!("../templates/page.css");

/// Lodging-search widget endpoint.
const LODGING_WIDGET_URL: &str = "https://widgets.stay22.com/widget.html";

/// Embedded map endpoint.
const MAP_EMBED_URL: &str = "https://maps.google.com/maps";

/// Directions endpoint (Google Maps URLs API).
const DIRECTIONS_URL: &str = "https://www.google.com/maps/dir/";

const APP_STORE_URL: &str = "https://apps.apple.com/gb/app/parkrunner-tourist/id6743163993";
const APP_STORE_BADGE: &str =
    "https://developer.apple.com/assets/elements/badges/download-on-the-app-store.svg";
const PLAY_STORE_URL: &str =
    "https://play.google.com/store/apps/details?id=co.uk.parkrunnertourist.app";
const PLAY_STORE_BADGE: &str =
    "https://upload.wikimedia.org/wikipedia/commons/7/78/Google_Play_Store_badge_EN.svg";

/// Default upper bound for the meta description, in characters.
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 160;

/// Nights between check-in and check-out in the lodging search.
const STAY_NIGHTS: u64 = 1;

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// Static, run-wide inputs to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Brand shown in the header.
    pub site_name: String,
    /// Target of the header link.
    pub site_url: String,
    /// Partner identifier for the lodging widget.
    pub lodging_partner_id: String,
    /// Zoom level for the map and lodging widget.
    pub map_zoom: u8,
    /// Maximum meta description length in characters (ellipsis included).
    pub description_limit: usize,
}

impl From<&AppConfig> for RenderConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            site_name: config.site.name.clone(),
            site_url: config.site.url.clone(),
            lodging_partner_id: config.site.lodging_partner_id.clone(),
            map_zoom: config.site.map_zoom,
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Render the complete HTML document for one event.
#[instrument(skip_all, fields(name = %event.name, %checkin))]
pub fn render_page(event: &CanonicalEvent, checkin: NaiveDate, config: &RenderConfig) -> String {
    let title = format!("Accommodation near {}", event.name);
    let description = event.description_or_default();
    let meta_description = truncate_chars(&description, config.description_limit);
    let keywords = keywords(event).join(", ");

    let lodging = lodging_url(event, checkin, config);
    let map = map_url(event, config.map_zoom);
    let directions = directions_url(event);

    let mut html = String::with_capacity(STYLESHEET.len() + 4096);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{title}</title>
<meta name="description" content="{meta_description}" />
<meta name="keywords" content="{keywords}" />
<meta name="geo.position" content="{lat};{lng}" />
<style>
{style}</style>
</head>
<body>
<header>
  <a href="{site_url}" target="_blank" rel="noopener noreferrer">{site_name}</a>
</header>
<section class="intro">
  <h1>{title}</h1>
  <p class="location">{location}</p>
  <p class="description">{description}</p>
</section>
"#,
        title = encode::text(&title),
        meta_description = encode::text(&meta_description),
        keywords = encode::text(&keywords),
        lat = event.latitude,
        lng = event.longitude,
        style = STYLESHEET,
        site_url = encode::text(&config.site_url),
        site_name = encode::text(&config.site_name),
        location = encode::text(event.location_or_default()),
        description = encode::text(&description),
    );

    let _ = write!(
        html,
        r#"<main>
  <section class="hotels">
    <h2>Nearby hotel prices for {short_name}</h2>
    <iframe src="{lodging}" title="Nearby hotels" loading="lazy" allowfullscreen></iframe>
  </section>
  <section class="map-section">
    <h2>Find accommodation</h2>
    <iframe src="{map}" title="Map of {name}" loading="lazy" allowfullscreen></iframe>
    <div class="directions">
      <a href="{directions}" target="_blank" rel="noopener noreferrer">Click for directions</a>
    </div>
  </section>
</main>
"#,
        short_name = encode::text(event.short_name_or_default()),
        name = encode::text(&event.name),
        lodging = encode::text(&lodging),
        map = encode::text(&map),
        directions = encode::text(&directions),
    );

    let _ = write!(
        html,
        r#"<footer>
  Download the app:
  <div class="download-links">
    <a href="{APP_STORE_URL}" target="_blank" rel="noopener noreferrer" aria-label="Download on the Apple App Store">
      <img src="{APP_STORE_BADGE}" alt="Apple App Store" />
    </a>
    <a href="{PLAY_STORE_URL}" target="_blank" rel="noopener noreferrer" aria-label="Get it on Google Play">
      <img src="{PLAY_STORE_BADGE}" alt="Google Play Store" />
    </a>
  </div>
</footer>
</body>
</html>
"#
    );

    html
}

// ---------------------------------------------------------------------------
// URL builders
// ---------------------------------------------------------------------------

/// Lodging search centred on the venue for the check-in night.
fn lodging_url(event: &CanonicalEvent, checkin: NaiveDate, config: &RenderConfig) -> String {
    let checkout = checkin
        .checked_add_days(Days::new(STAY_NIGHTS))
        .unwrap_or(checkin);

    format!(
        "{LODGING_WIDGET_URL}?lat={}&lng={}&zoom={}&checkin={}&checkout={}&venue={}&partnerId={}",
        encode::component(&event.latitude.to_string()),
        encode::component(&event.longitude.to_string()),
        config.map_zoom,
        checkin.format("%Y-%m-%d"),
        checkout.format("%Y-%m-%d"),
        encode::component(&event.name),
        encode::component(&config.lodging_partner_id),
    )
}

fn map_url(event: &CanonicalEvent, zoom: u8) -> String {
    let query = format!("{},{}", event.latitude, event.longitude);
    format!(
        "{MAP_EMBED_URL}?q={}&z={zoom}&output=embed",
        encode::component(&query)
    )
}

/// Directions to the raw location text when known, otherwise to the coordinates.
fn directions_url(event: &CanonicalEvent) -> String {
    let destination = match &event.location {
        Some(location) => location.clone(),
        None => format!("{},{}", event.latitude, event.longitude),
    };
    format!(
        "{DIRECTIONS_URL}?api=1&destination={}",
        encode::component(&destination)
    )
}

// ---------------------------------------------------------------------------
// Metadata helpers
// ---------------------------------------------------------------------------

/// Cut `text` to at most `limit` characters, ending in `…` when shortened.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    if limit == 0 {
        return String::new();
    }

    let kept: String = text.chars().take(limit - 1).collect();
    format!("{}…", kept.trim_end())
}

/// Lowercased word tokens of the name and location, first occurrence wins.
pub fn keywords(event: &CanonicalEvent) -> Vec<String> {
    let mut seen = HashSet::new();
    let sources = [Some(event.name.as_str()), event.location.as_deref()];

    sources
        .into_iter()
        .flatten()
        .flat_map(|source| source.split(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
