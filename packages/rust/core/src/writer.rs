//! Output directory writer.
//!
//! Owns the output directory for the duration of a run. Every run starts
//! from an empty directory, so pages from earlier batches never linger.

use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use eventpages_shared::{EventPagesError, Result, check_sitemap_file};

use crate::sitemap::Sitemap;

/// File extension of generated pages.
pub const PAGE_EXTENSION: &str = "html";

/// A file written by the [`OutputWriter`].
#[derive(Debug, Clone)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Writes pages and the sitemap into one directory.
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Purge `dir` and recreate it empty.
    ///
    /// Refuses paths with no named component (`/`, `.`), any path containing
    /// `..`, and the user's home directory or any of its parents.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn prepare(dir: &Path) -> Result<Self> {
        ensure_purgeable(dir)?;

        if dir.exists() {
            std::fs::remove_dir_all(dir).map_err(|e| EventPagesError::io(dir, e))?;
            debug!("purged previous output");
        }

        std::fs::create_dir_all(dir).map_err(|e| EventPagesError::io(dir, e))?;
        info!("output directory ready");

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<slug>.html`
    pub fn page_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.{PAGE_EXTENSION}"))
    }

    /// Write one rendered page.
    pub fn write_page(&self, slug: &str, html: &str) -> Result<WrittenFile> {
        if slug.is_empty()
            || !slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(EventPagesError::validation(format!(
                "refusing to write page with unsafe slug {slug:?}"
            )));
        }

        self.write_atomic(&format!("{slug}.{PAGE_EXTENSION}"), html)
    }

    /// Write the sitemap as `<dir>/<file_name>`.
    pub fn write_sitemap(&self, sitemap: &Sitemap, file_name: &str) -> Result<WrittenFile> {
        check_sitemap_file(file_name)?;
        self.write_atomic(file_name, &sitemap.to_xml())
    }

    /// Write to a dot-prefixed temp file, then rename over the target.
    fn write_atomic(&self, file_name: &str, content: &str) -> Result<WrittenFile> {
        let target = self.dir.join(file_name);
        let temp = self.dir.join(format!(".{file_name}.tmp"));

        std::fs::write(&temp, content).map_err(|e| EventPagesError::io(&temp, e))?;
        std::fs::rename(&temp, &target).map_err(|e| EventPagesError::io(&target, e))?;

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let sha256 = format!("{:x}", hasher.finalize());

        debug!(path = %target.display(), size = content.len(), "wrote file");

        Ok(WrittenFile {
            path: target,
            sha256,
            size_bytes: content.len(),
        })
    }
}

fn ensure_purgeable(dir: &Path) -> Result<()> {
    let mut has_name = false;
    for component in dir.components() {
        match component {
            Component::Normal(_) => has_name = true,
            Component::ParentDir => {
                return Err(EventPagesError::validation(format!(
                    "refusing to purge output directory {dir:?} containing '..'"
                )));
            }
            _ => {}
        }
    }
    if !has_name {
        return Err(EventPagesError::validation(format!(
            "refusing to purge output directory {dir:?}"
        )));
    }

    let home = dirs::home_dir().and_then(|home| home.canonicalize().ok());
    if let (Ok(target), Some(home)) = (dir.canonicalize(), home) {
        if home.starts_with(&target) {
            return Err(EventPagesError::validation(format!(
                "refusing to purge {} (home directory or one of its parents)",
                target.display()
            )));
        }
    }

    Ok(())
}
