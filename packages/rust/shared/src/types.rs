//! Core domain types shared by the feed, render, and core crates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name used when a feature carries none of the known name fields.
pub const FALLBACK_NAME: &str = "Unnamed event";

/// Location text used when `EventLocation` is absent.
pub const FALLBACK_LOCATION: &str = "Location to be confirmed";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one generation run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// CanonicalEvent
// ---------------------------------------------------------------------------

/// One normalized event, independent of the feed shape it came from.
///
/// Built by the normalizer and never mutated afterwards. Optional fields keep
/// their absence; the `*_or_default` accessors apply the documented fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Display name, never empty.
    pub name: String,
    /// Short identifier (`EventShortName`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Free-text venue location (`EventLocation`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Upstream description; untrusted text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Latitude in degrees; `0.0` when the feed had no usable coordinates.
    pub latitude: f64,
    /// Longitude in degrees; `0.0` when the feed had no usable coordinates.
    pub longitude: f64,
}

impl CanonicalEvent {
    /// Short name, falling back to the full name.
    pub fn short_name_or_default(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }

    /// Location text, falling back to [`FALLBACK_LOCATION`].
    pub fn location_or_default(&self) -> &str {
        self.location.as_deref().unwrap_or(FALLBACK_LOCATION)
    }

    /// Description, falling back to a sentence built from the name.
    pub fn description_or_default(&self) -> String {
        match &self.description {
            Some(text) => text.clone(),
            None => format!("Find places to stay near {}.", self.name),
        }
    }

    /// Whether the coordinates are the `(0, 0)` placeholder.
    pub fn has_placeholder_coordinates(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(name: &str) -> CanonicalEvent {
        CanonicalEvent {
            name: name.into(),
            short_name: None,
            location: None,
            description: None,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn run_id_is_time_sortable() {
        let a = RunId::new();
        let b = RunId::new();
        assert!(a.0 <= b.0);
        assert_eq!(a.to_string().len(), 36);
    }

    #[test]
    fn fallbacks_applied_when_absent() {
        let event = bare("Bushy Park");
        assert_eq!(event.short_name_or_default(), "Bushy Park");
        assert_eq!(event.location_or_default(), FALLBACK_LOCATION);
        assert_eq!(
            event.description_or_default(),
            "Find places to stay near Bushy Park."
        );
        assert!(event.has_placeholder_coordinates());
    }

    #[test]
    fn present_values_win_over_fallbacks() {
        let event = CanonicalEvent {
            short_name: Some("bushy".into()),
            location: Some("Teddington".into()),
            description: Some("Home of parkrun.".into()),
            latitude: 51.41,
            longitude: -0.33,
            ..bare("Bushy Park")
        };
        assert_eq!(event.short_name_or_default(), "bushy");
        assert_eq!(event.location_or_default(), "Teddington");
        assert_eq!(event.description_or_default(), "Home of parkrun.");
        assert!(!event.has_placeholder_coordinates());
    }

    #[test]
    fn serialization_skips_absent_fields() {
        let json = serde_json::to_string(&bare("A")).expect("serialize");
        assert!(!json.contains("location"));
        let parsed: CanonicalEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, bare("A"));
    }
}
