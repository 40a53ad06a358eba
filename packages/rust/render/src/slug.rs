//! URL-safe identifiers derived from event names.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Slug used when a name reduces to nothing (e.g. all punctuation or non-Latin script).
pub const EMPTY_SLUG_FALLBACK: &str = "event";

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]").expect("disallowed-chars regex"));

static HYPHEN_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("hyphen-run regex"));

// ---------------------------------------------------------------------------
// slugify
// ---------------------------------------------------------------------------

/// Derive a slug from a name.
///
/// The result matches `^[a-z0-9]+(-[a-z0-9]+)*$` or is empty, and
/// `slugify(&slugify(x)) == slugify(x)`.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let hyphenated = WHITESPACE_RE.replace_all(&lowered, "-");
    let stripped = DISALLOWED_RE.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN_RE.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// SlugRegistry
// ---------------------------------------------------------------------------

/// Hands out unique slugs within one batch.
///
/// The first claim of a slug returns it unchanged; later claims get `-2`,
/// `-3`, ... appended, skipping any candidate already handed out.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    claimed: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `base` (or the next free suffixed form of it).
    pub fn claim(&mut self, base: &str) -> String {
        let base = if base.is_empty() {
            EMPTY_SLUG_FALLBACK
        } else {
            base
        };

        if self.claimed.insert(base.to_string()) {
            return base.to_string();
        }

        let mut n: usize = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if self.claimed.insert(candidate.clone()) {
                warn!(base, slug = %candidate, "slug collision, appended suffix");
                return candidate;
            }
            n += 1;
        }
    }

    /// Number of slugs handed out so far.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FORMAT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

    const SAMPLES: &[&str] = &[
        "Bushy Park",
        "St. James's Park!",
        "  leading and trailing  ",
        "multiple   spaces\tand\ttabs",
        "--already-hyphenated--",
        "Under_score & Ampersand",
        "Straße Café Ünïcode",
        "東京",
        "!!!",
        "",
        "a - b -- c",
        "UPPER lower 123",
    ];

    #[test]
    fn strips_punctuation_and_apostrophes() {
        assert_eq!(slugify("St. James's Park!"), "st-jamess-park");
    }

    #[test]
    fn basic_names() {
        assert_eq!(slugify("Bushy Park"), "bushy-park");
        assert_eq!(slugify("a - b -- c"), "a-b-c");
        assert_eq!(slugify("Under_score & Ampersand"), "underscore-ampersand");
        assert_eq!(slugify("Straße Café"), "strae-caf");
    }

    #[test]
    fn names_without_allowed_chars_become_empty() {
        assert_eq!(slugify("東京"), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn idempotent() {
        for sample in SAMPLES {
            let once = slugify(sample);
            assert_eq!(slugify(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn output_format() {
        for sample in SAMPLES {
            let slug = slugify(sample);
            assert!(
                slug.is_empty() || FORMAT_RE.is_match(&slug),
                "bad slug {slug:?} for {sample:?}"
            );
        }
    }

    #[test]
    fn registry_suffixes_collisions() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.claim("bushy-park"), "bushy-park");
        assert_eq!(registry.claim("bushy-park"), "bushy-park-2");
        assert_eq!(registry.claim("bushy-park"), "bushy-park-3");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn registry_skips_naturally_taken_suffix() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.claim("park-2"), "park-2");
        assert_eq!(registry.claim("park"), "park");
        assert_eq!(registry.claim("park"), "park-3");
    }

    #[test]
    fn registry_replaces_empty_slug() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.claim(""), EMPTY_SLUG_FALLBACK);
        assert_eq!(registry.claim(""), "event-2");
        assert!(FORMAT_RE.is_match(&registry.claim("")));
    }
}
