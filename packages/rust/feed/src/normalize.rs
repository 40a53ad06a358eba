//! Feed shape resolution and record normalization.
//!
//! Accepted top-level shapes, tried in this order:
//! 1. `[feature, ...]`
//! 2. `{"features": [feature, ...]}`
//! 3. `{"events": {"features": [...]}}`, or any other object-valued field
//!    holding a `features` array (fields checked in key order after `events`)

use eventpages_shared::{CanonicalEvent, EventPagesError, FALLBACK_NAME, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

/// Wrapper key the upstream feed normally nests its collection under.
const NESTED_KEY: &str = "events";

/// Name fields, in resolution order.
const NAME_FIELDS: [&str; 3] = ["EventLongName", "EventShortName", "eventname"];

// ---------------------------------------------------------------------------
// FeedShape
// ---------------------------------------------------------------------------

/// The top-level layout a payload was recognized as, with its feature list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedShape<'a> {
    /// The payload itself is the feature array.
    Bare(&'a [Value]),
    /// An object with a `features` array.
    Features(&'a [Value]),
    /// An object whose field `key` holds an object with a `features` array.
    Nested { key: &'a str, features: &'a [Value] },
}

impl<'a> FeedShape<'a> {
    /// The resolved feature sequence, in feed order.
    pub fn features(&self) -> &'a [Value] {
        match *self {
            Self::Bare(features) | Self::Features(features) => features,
            Self::Nested { features, .. } => features,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bare(_) => "bare",
            Self::Features(_) => "features",
            Self::Nested { .. } => "nested",
        }
    }
}

/// Match the payload against the accepted shapes in priority order.
pub fn resolve_shape(payload: &Value) -> Result<FeedShape<'_>> {
    if let Some(items) = payload.as_array() {
        return Ok(FeedShape::Bare(items));
    }

    let Some(object) = payload.as_object() else {
        return Err(EventPagesError::schema(format!(
            "expected an array or object at the top level, found {}",
            json_kind(payload)
        )));
    };

    if let Some(items) = features_of(object) {
        return Ok(FeedShape::Features(items));
    }

    let preferred = object.get_key_value(NESTED_KEY);
    let nested = preferred
        .into_iter()
        .chain(object.iter().filter(|(key, _)| key.as_str() != NESTED_KEY))
        .find_map(|(key, value)| {
            value
                .as_object()
                .and_then(features_of)
                .map(|features| FeedShape::Nested {
                    key: key.as_str(),
                    features,
                })
        });

    nested.ok_or_else(|| {
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        EventPagesError::schema(format!(
            "no features array found (top-level keys: [{}])",
            keys.join(", ")
        ))
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Resolve the payload shape and convert the first `max_events` features.
///
/// Order is preserved; features beyond the cap are dropped silently.
/// Per-feature defects fall back to documented defaults and never fail.
#[instrument(skip(payload))]
pub fn normalize(payload: &Value, max_events: usize) -> Result<Vec<CanonicalEvent>> {
    let shape = resolve_shape(payload)?;
    let features = shape.features();

    let events: Vec<CanonicalEvent> = features
        .iter()
        .take(max_events)
        .map(canonicalize)
        .collect();

    if features.len() > events.len() {
        debug!(dropped = features.len() - events.len(), "batch capped");
    }

    info!(
        shape = shape.label(),
        available = features.len(),
        kept = events.len(),
        "feed normalized"
    );

    Ok(events)
}

/// Convert one raw feature into a canonical record.
pub fn canonicalize(feature: &Value) -> CanonicalEvent {
    let properties = feature.get("properties");
    let text = |key: &str| {
        properties
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let name = NAME_FIELDS
        .iter()
        .find_map(|&key| text(key))
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    let (longitude, latitude) = coordinates(feature).unwrap_or_else(|| {
        debug!(%name, "missing or malformed coordinates, using (0, 0)");
        (0.0, 0.0)
    });

    CanonicalEvent {
        name,
        short_name: text("EventShortName"),
        location: text("EventLocation"),
        description: text("EventDescription"),
        latitude,
        longitude,
    }
}

/// Read `geometry.coordinates` as `[lon, lat]`.
fn coordinates(feature: &Value) -> Option<(f64, f64)> {
    let coords = feature.get("geometry")?.get("coordinates")?.as_array()?;
    let longitude = coords.first()?.as_f64()?;
    let latitude = coords.get(1)?.as_f64()?;

    (longitude.is_finite() && latitude.is_finite()).then_some((longitude, latitude))
}

fn features_of(object: &Map<String, Value>) -> Option<&[Value]> {
    object.get("features")?.as_array().map(Vec::as_slice)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
