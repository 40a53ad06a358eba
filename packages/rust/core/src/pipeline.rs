//! End-to-end `generate` pipeline: feed → normalize → slug → render → write → sitemap.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use eventpages_feed::{FeedSource, FetchOptions};
use eventpages_render::{RenderConfig, SlugRegistry, render_page, slugify};
use eventpages_shared::{AppConfig, CanonicalEvent, Result, RunId};

use crate::sitemap::build_sitemap;
use crate::writer::{OutputWriter, WrittenFile};

/// Configuration for one `generate` run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Where the feed comes from.
    pub feed: FeedSource,
    /// Timeout and retry settings for remote feeds.
    pub fetch: FetchOptions,
    /// Maximum number of records per run.
    pub max_events: usize,
    /// Directory purged and refilled by the run.
    pub output_dir: PathBuf,
    /// Sitemap file name inside `output_dir`.
    pub sitemap_file: String,
    /// Public URL prefix of the generated pages.
    pub base_url: String,
    /// Page template settings.
    pub render: RenderConfig,
    /// Check-in date shared by every page.
    pub checkin: NaiveDate,
    /// `lastmod` of every sitemap entry.
    pub generated_on: NaiveDate,
}

impl GenerateConfig {
    /// Build from the loaded application config.
    ///
    /// Dates are passed in so the pipeline itself never reads the clock.
    pub fn from_app_config(
        config: &AppConfig,
        checkin: NaiveDate,
        generated_on: NaiveDate,
    ) -> Result<Self> {
        Ok(Self {
            feed: config.feed.source.parse()?,
            fetch: FetchOptions::from(&config.feed),
            max_events: config.feed.max_events,
            output_dir: PathBuf::from(&config.output.dir),
            sitemap_file: config.output.sitemap_file.clone(),
            base_url: config.site.base_url.clone(),
            render: RenderConfig::from(config),
            checkin,
            generated_on,
        })
    }
}

/// One page produced by a run.
#[derive(Debug, Clone)]
pub struct GeneratedPage {
    /// Display name of the event.
    pub name: String,
    /// Slug claimed for the event (file stem and URL segment).
    pub slug: String,
    /// The written file.
    pub file: WrittenFile,
}

/// Result of the `generate` pipeline.
#[derive(Debug)]
pub struct GenerateResult {
    pub run_id: RunId,
    pub output_dir: PathBuf,
    /// Pages in feed order.
    pub pages: Vec<GeneratedPage>,
    pub sitemap: WrittenFile,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each page is written.
    fn page_written(&self, slug: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &GenerateResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_written(&self, _slug: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &GenerateResult) {}
}

/// Run the full `generate` pipeline.
///
/// 1. Fetch the feed
/// 2. Normalize into canonical records
/// 3. Purge and recreate the output directory
/// 4. Slug, render and write one page per record
/// 5. Write the sitemap
///
/// The output directory is untouched if steps 1 or 2 fail. Any later error
/// aborts the run and leaves the files written so far in place.
#[instrument(skip_all, fields(feed = %config.feed, out = %config.output_dir.display()))]
pub async fn generate(
    config: &GenerateConfig,
    progress: &dyn ProgressReporter,
) -> Result<GenerateResult> {
    let start = Instant::now();
    let run_id = RunId::new();

    info!(%run_id, checkin = %config.checkin, "starting generate pipeline");

    // --- Phase 1: Fetch + normalize ---
    progress.phase("Fetching feed");
    let events = inspect(&config.feed, &config.fetch, config.max_events).await?;

    // --- Phase 2: Output directory ---
    progress.phase("Preparing output directory");
    let writer = OutputWriter::prepare(&config.output_dir)?;

    // --- Phase 3: Pages ---
    progress.phase("Writing pages");
    let total = events.len();
    let mut slugs = SlugRegistry::new();
    let mut pages = Vec::with_capacity(total);

    for (i, event) in events.into_iter().enumerate() {
        let slug = slugs.claim(&slugify(&event.name));
        if event.has_placeholder_coordinates() {
            warn!(name = %event.name, %slug, "event has no coordinates, map will point at 0,0");
        }

        let html = render_page(&event, config.checkin, &config.render);
        let file = writer.write_page(&slug, &html)?;
        debug!(%slug, bytes = file.size_bytes, "page written");

        progress.page_written(&slug, i + 1, total);
        pages.push(GeneratedPage {
            name: event.name,
            slug,
            file,
        });
    }

    // --- Phase 4: Sitemap ---
    progress.phase("Writing sitemap");
    let page_slugs: Vec<&str> = pages.iter().map(|page| page.slug.as_str()).collect();
    let sitemap = build_sitemap(&page_slugs, &config.base_url, config.generated_on);
    let sitemap = writer.write_sitemap(&sitemap, &config.sitemap_file)?;

    let result = GenerateResult {
        run_id,
        output_dir: writer.dir().to_path_buf(),
        pages,
        sitemap,
        elapsed: start.elapsed(),
    };

    info!(
        run_id = %result.run_id,
        pages = result.pages.len(),
        elapsed_ms = result.elapsed.as_millis() as u64,
        "generate pipeline complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Fetch and normalize the feed without touching the filesystem.
#[instrument(skip_all, fields(feed = %source, max_events))]
pub async fn inspect(
    source: &FeedSource,
    fetch: &FetchOptions,
    max_events: usize,
) -> Result<Vec<CanonicalEvent>> {
    let payload = eventpages_feed::fetch(source, fetch).await?;
    eventpages_feed::normalize(&payload, max_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventpages_shared::{EventPagesError, FALLBACK_NAME};
    use std::path::Path;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("ep-pipeline-test-{}", uuid::Uuid::now_v7()))
    }

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/feeds")
            .join(name)
    }

    fn test_config(feed: FeedSource, out: &Path) -> GenerateConfig {
        GenerateConfig {
            feed,
            fetch: FetchOptions {
                timeout_secs: 5,
                retries: 0,
                retry_backoff_ms: 1,
            },
            max_events: 10,
            output_dir: out.to_path_buf(),
            sitemap_file: "sitemap.xml".into(),
            base_url: "https://example.com/events".into(),
            render: RenderConfig::default(),
            checkin: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
            generated_on: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        }
    }

    async fn serve(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    fn remote(server: &MockServer) -> FeedSource {
        format!("{}/events.json", server.uri()).parse().unwrap()
    }

    #[derive(Default)]
    struct RecordingProgress {
        written: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn page_written(&self, slug: &str, _current: usize, _total: usize) {
            self.written.lock().unwrap().push(slug.to_string());
        }
        fn done(&self, _result: &GenerateResult) {}
    }

    #[tokio::test]
    async fn bushy_park_end_to_end() {
        let server = serve(serde_json::json!({
            "events": {
                "features": [{
                    "properties": { "eventname": "Bushy Park" },
                    "geometry": { "coordinates": [-0.33, 51.41] }
                }]
            }
        }))
        .await;
        let out = temp_dir();

        let result = generate(&test_config(remote(&server), &out), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].slug, "bushy-park");
        assert_eq!(result.pages[0].name, "Bushy Park");

        let html = std::fs::read_to_string(out.join("bushy-park.html")).unwrap();
        assert!(html.contains("51.41"));
        assert!(html.contains("-0.33"));
        assert!(html.contains("Bushy Park"));

        let xml = std::fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert_eq!(xml.matches("<loc>").count(), 1);
        assert!(xml.contains("<loc>https://example.com/events/bushy-park.html</loc>"));
        assert!(xml.contains("<lastmod>2026-10-18</lastmod>"));
        assert_eq!(result.sitemap.path, out.join("sitemap.xml"));

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn colliding_names_get_distinct_files() {
        let feature = serde_json::json!({
            "properties": { "eventname": "Riverside" },
            "geometry": { "coordinates": [1.0, 2.0] }
        });
        let server = serve(serde_json::json!([feature.clone(), feature.clone(), feature])).await;
        let out = temp_dir();
        let progress = RecordingProgress::default();

        let result = generate(&test_config(remote(&server), &out), &progress)
            .await
            .unwrap();

        let slugs: Vec<&str> = result.pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["riverside", "riverside-2", "riverside-3"]);
        assert_eq!(*progress.written.lock().unwrap(), slugs);
        for slug in slugs {
            assert!(out.join(format!("{slug}.html")).exists());
        }

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn nameless_and_unsluggable_events_still_get_pages() {
        let server = serve(serde_json::json!([
            { "properties": {}, "geometry": { "coordinates": [1.0, 2.0] } },
            { "properties": { "eventname": "東京" } },
            { "properties": { "EventLongName": "!!!" } }
        ]))
        .await;
        let out = temp_dir();

        let result = generate(&test_config(remote(&server), &out), &SilentProgress)
            .await
            .unwrap();

        let slugs: Vec<&str> = result.pages.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["unnamed-event", "event", "event-2"]);
        assert_eq!(result.pages[0].name, FALLBACK_NAME);

        let html = std::fs::read_to_string(out.join("unnamed-event.html")).unwrap();
        assert!(html.contains(&format!("<title>Accommodation near {FALLBACK_NAME}</title>")));
        assert!(html.contains(&format!("Find places to stay near {FALLBACK_NAME}.")));
        assert!(html.contains(r#"<meta name="keywords" content="unnamed, event" />"#));

        assert!(out.join("event.html").exists());
        assert!(out.join("event-2.html").exists());
        let xml = std::fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert!(xml.contains("<loc>https://example.com/events/event.html</loc>"));
        assert!(xml.contains("<loc>https://example.com/events/event-2.html</loc>"));

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn stale_pages_are_purged() {
        let server = serve(serde_json::json!({
            "features": [{ "properties": { "eventname": "Fresh" } }]
        }))
        .await;
        let out = temp_dir();
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("old-event.html"), "stale").unwrap();

        generate(&test_config(remote(&server), &out), &SilentProgress)
            .await
            .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["fresh.html", "sitemap.xml"]);

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn schema_error_leaves_previous_output() {
        let server = serve(serde_json::json!({ "data": [1, 2, 3] })).await;
        let out = temp_dir();
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("kept.html"), "previous").unwrap();

        let err = generate(&test_config(remote(&server), &out), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, EventPagesError::Schema { .. }));
        assert_eq!(std::fs::read_to_string(out.join("kept.html")).unwrap(), "previous");

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn max_events_caps_pages_and_sitemap() {
        let out = temp_dir();
        let mut config = test_config(FeedSource::Local(fixture("features.json")), &out);
        config.max_events = 2;

        let result = generate(&config, &SilentProgress).await.unwrap();

        assert_eq!(result.pages.len(), 2);
        let xml = std::fs::read_to_string(&result.sitemap.path).unwrap();
        assert_eq!(xml.matches("<url>").count(), 2);

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn zero_events_writes_empty_sitemap() {
        let out = temp_dir();
        let mut config = test_config(FeedSource::Local(fixture("features.json")), &out);
        config.max_events = 0;

        let result = generate(&config, &SilentProgress).await.unwrap();

        assert!(result.pages.is_empty());
        let xml = std::fs::read_to_string(&result.sitemap.path).unwrap();
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));

        let _ = std::fs::remove_dir_all(&out);
    }

    #[tokio::test]
    async fn local_fixture_shapes_produce_same_pages() {
        let mut outputs = Vec::new();
        for name in ["features.json", "bare.json", "nested.json"] {
            let out = temp_dir();
            let config = test_config(FeedSource::Local(fixture(name)), &out);
            let result = generate(&config, &SilentProgress).await.unwrap();

            let pages: Vec<(String, String)> = result
                .pages
                .iter()
                .map(|p| (p.slug.clone(), p.file.sha256.clone()))
                .collect();
            outputs.push(pages);

            let _ = std::fs::remove_dir_all(&out);
        }

        assert_eq!(outputs[0].len(), 3);
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[0], outputs[2]);
    }

    #[tokio::test]
    async fn inspect_does_not_touch_output() {
        let events = inspect(
            &FeedSource::Local(fixture("features.json")),
            &FetchOptions::default(),
            10,
        )
        .await
        .unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].name, "Bushy Park");
    }

    #[test]
    fn config_from_app_config() {
        let app = AppConfig::default();
        let checkin = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let config = GenerateConfig::from_app_config(&app, checkin, today).unwrap();

        assert_eq!(config.max_events, 10);
        assert_eq!(config.sitemap_file, "sitemap.xml");
        assert_eq!(config.base_url, app.site.base_url);
        assert_eq!(config.render.map_zoom, 13);
        assert!(matches!(config.feed, FeedSource::Remote(_)));
    }
}
