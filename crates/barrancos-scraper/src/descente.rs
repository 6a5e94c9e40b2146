//! Coordinates from Descente-Canyon map pages.
//!
//! Each canyon page embeds its map markers as
//! `new google.maps.LatLng(lat,lng),type: 'depart'` JavaScript snippets.

use std::sync::LazyLock;
use std::time::Duration;

use barrancos_catalog::fields::parse_finite;
use regex::Regex;
use serde_json::{json, Value};

use crate::client::{EnrichmentClient, HTML_ACCEPT};
use crate::enrich::{pause, EnrichSummary};
use crate::search_links::encode_component;

pub const DESCENTE_BASE_URL: &str = "https://www.descente-canyon.com/canyoning/canyon-carte";

/// Marker types in the order they are preferred as the canyon's main point.
const MARKER_PRIORITY: &[&str] = &[
    "depart",
    "parking",
    "arrivee",
    "point_externe",
    "point_interne",
];

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"new google\.maps\.LatLng\(([-\d.]+),([-\d.]+)\),type: '([^']+)'")
        .expect("valid marker regex")
});

/// One point on a Descente-Canyon map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: String,
    pub lat: f64,
    pub lng: f64,
}

impl Marker {
    fn to_json(&self) -> Value {
        json!({"type": self.kind, "lat": self.lat, "lng": self.lng})
    }

    fn matches_json(&self, value: &Value) -> bool {
        value.get("type").and_then(Value::as_str) == Some(self.kind.as_str())
            && value.get("lat").and_then(Value::as_f64) == Some(self.lat)
            && value.get("lng").and_then(Value::as_f64) == Some(self.lng)
    }
}

#[derive(Debug, Clone)]
pub struct CoordinateOptions {
    pub base_url: String,
    /// Zoom used when the record has no zoom of its own.
    pub zoom: f64,
    pub delay: Duration,
    /// Maximum number of records to look up.
    pub limit: Option<usize>,
    /// Dataset index to start from.
    pub start: usize,
}

/// Map page URL for a Descente-Canyon canyon id.
#[must_use]
pub fn map_page_url(base_url: &str, canyon_id: &str) -> String {
    format!(
        "{}/{}/carte.html",
        base_url.trim_end_matches('/'),
        encode_component(canyon_id)
    )
}

/// Extracts every marker with finite coordinates from a map page.
#[must_use]
pub fn parse_markers(html: &str) -> Vec<Marker> {
    MARKER_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let lat = caps[1].parse::<f64>().ok().filter(|v| v.is_finite())?;
            let lng = caps[2].parse::<f64>().ok().filter(|v| v.is_finite())?;
            Some(Marker {
                kind: caps[3].to_owned(),
                lat,
                lng,
            })
        })
        .collect()
}

/// Picks the marker that best represents the canyon: the first of the
/// highest-priority type present, else the first marker.
#[must_use]
pub fn pick_primary_marker(markers: &[Marker]) -> Option<&Marker> {
    MARKER_PRIORITY
        .iter()
        .find_map(|kind| markers.iter().find(|m| m.kind == *kind))
        .or_else(|| markers.first())
}

/// Writes `coordinates` and `descente_markers` into a raw dataset record.
///
/// The primary marker becomes the coordinates; an existing zoom is kept,
/// otherwise `default_zoom` is used. New markers are appended to any
/// existing `descente_markers`, skipping exact duplicates. Returns `false`
/// (and leaves the record untouched) when there are no markers or the
/// record is not an object.
pub fn enrich_with_markers(item: &mut Value, markers: &[Marker], default_zoom: f64) -> bool {
    let Some(record) = item.as_object_mut() else {
        return false;
    };
    let Some(primary) = pick_primary_marker(markers) else {
        return false;
    };

    let zoom = record
        .get("coordinates")
        .and_then(|coords| parse_finite(coords.get("zoom")))
        .unwrap_or(default_zoom);

    let mut merged: Vec<Value> = record
        .get("descente_markers")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for marker in markers {
        if !merged.iter().any(|existing| marker.matches_json(existing)) {
            merged.push(marker.to_json());
        }
    }

    record.insert(
        "coordinates".to_owned(),
        json!({"lat": primary.lat, "lng": primary.lng, "zoom": zoom}),
    );
    record.insert("descente_markers".to_owned(), Value::Array(merged));
    true
}

/// Looks up map markers for each record with an `id`, sequentially.
///
/// Failures and pages without markers are logged and skipped; the run
/// always completes.
pub async fn enrich_coordinates(
    client: &EnrichmentClient,
    dataset: &mut [Value],
    options: &CoordinateOptions,
) -> EnrichSummary {
    let mut summary = EnrichSummary::default();
    let total = dataset.len();

    for (index, item) in dataset.iter_mut().enumerate().skip(options.start) {
        let Some(id) = record_id(item) else {
            continue;
        };
        if options.limit.is_some_and(|limit| summary.processed >= limit) {
            break;
        }
        summary.processed += 1;

        let url = map_page_url(&options.base_url, &id);
        tracing::info!(id = %id, name = %display_name(item), "fetching map markers");
        match client.fetch_text(&url, HTML_ACCEPT).await {
            Ok(html) => {
                let markers = parse_markers(&html);
                if enrich_with_markers(item, &markers, options.zoom) {
                    summary.updated += 1;
                    tracing::info!(id = %id, markers = markers.len(), "coordinates updated");
                } else {
                    tracing::warn!(id = %id, "no map markers found");
                }
            }
            Err(err) => tracing::error!(id = %id, error = %err, "map page lookup failed"),
        }

        pause(options.delay, index + 1 < total).await;
    }

    summary
}

fn record_id(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn display_name(item: &Value) -> &str {
    ["nombre", "name"]
        .iter()
        .find_map(|key| item.get(*key).and_then(Value::as_str))
        .unwrap_or("sin nombre")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP_HTML: &str = r"
        var m1 = new google.maps.Marker({position: new google.maps.LatLng(42.2871,-0.0532),type: 'arrivee'});
        var m2 = new google.maps.Marker({position: new google.maps.LatLng(42.2950,-0.0601),type: 'depart'});
        var m3 = new google.maps.Marker({position: new google.maps.LatLng(-,-),type: 'parking'});
    ";

    #[test]
    fn parse_markers_skips_unparseable_coordinates() {
        let markers = parse_markers(MAP_HTML);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].kind, "arrivee");
        assert!((markers[1].lat - 42.295).abs() < 1e-9);
    }

    #[test]
    fn primary_marker_follows_priority() {
        let markers = parse_markers(MAP_HTML);
        assert_eq!(pick_primary_marker(&markers).unwrap().kind, "depart");
    }

    #[test]
    fn primary_marker_defaults_to_first() {
        let markers = vec![
            Marker {
                kind: "rappel".to_owned(),
                lat: 1.0,
                lng: 2.0,
            },
            Marker {
                kind: "other".to_owned(),
                lat: 3.0,
                lng: 4.0,
            },
        ];
        assert_eq!(pick_primary_marker(&markers).unwrap().kind, "rappel");
        assert!(pick_primary_marker(&[]).is_none());
    }

    #[test]
    fn enrich_keeps_existing_zoom_and_deduplicates_markers() {
        let markers = parse_markers(MAP_HTML);
        let mut item = json!({
            "id": "1234",
            "coordinates": {"lat": 0.0, "lng": 0.0, "zoom": 16},
            "descente_markers": [{"type": "depart", "lat": 42.295, "lng": -0.0601}]
        });

        assert!(enrich_with_markers(&mut item, &markers, 14.0));
        assert_eq!(item["coordinates"], json!({"lat": 42.295, "lng": -0.0601, "zoom": 16.0}));
        assert_eq!(item["descente_markers"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn enrich_uses_default_zoom_without_existing_coordinates() {
        let markers = parse_markers(MAP_HTML);
        let mut item = json!({"id": "1234"});
        assert!(enrich_with_markers(&mut item, &markers, 14.0));
        assert_eq!(item["coordinates"]["zoom"], json!(14.0));
    }

    #[test]
    fn enrich_without_markers_leaves_record_alone() {
        let mut item = json!({"id": "1234"});
        assert!(!enrich_with_markers(&mut item, &[], 14.0));
        assert_eq!(item, json!({"id": "1234"}));
    }

    #[test]
    fn map_page_url_encodes_id() {
        assert_eq!(
            map_page_url(DESCENTE_BASE_URL, "12 34"),
            "https://www.descente-canyon.com/canyoning/canyon-carte/12%2034/carte.html"
        );
    }

    #[test]
    fn record_id_accepts_strings_and_numbers() {
        assert_eq!(record_id(&json!({"id": 99})).as_deref(), Some("99"));
        assert_eq!(record_id(&json!({"id": " a1 "})).as_deref(), Some("a1"));
        assert_eq!(record_id(&json!({"id": ""})), None);
        assert_eq!(record_id(&json!({"name": "x"})), None);
    }
}
