//! Canonical canyon shape produced by the catalog pipeline.
//!
//! Raw dataset entries have no fixed schema, so they are carried around as a
//! plain JSON object ([`RawRecord`]) and only the projected
//! [`CanonicalCanyon`] is strongly typed.

use serde::{Deserialize, Serialize};

/// An un-normalized source entry: string keys, untyped values.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Sentinel used when a canyon has no usable difficulty grade.
pub const NO_DATA: &str = "Sin datos";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalCanyon {
    pub id: String,
    pub name: String,
    pub difficulty: String,
    pub difficulty_vertical: Option<String>,
    pub difficulty_aquatic: Option<String>,
    pub description: String,
    pub summary: String,
    pub gear: Vec<String>,
    pub max_rappel_meters: Option<f64>,
    pub rating_average: Option<f64>,
    pub rating_votes: u32,
    pub wikiloc: WikilocLinks,
    #[serde(rename = "wikiloc_search_url")]
    pub wikiloc_search_url: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub location: Location,
    /// Tags of the datasets this record was assembled from.
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikilocLinks {
    pub approach: Option<String>,
    #[serde(rename = "return")]
    pub return_: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub locality: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub text: Option<String>,
}

impl Location {
    /// Comma-joins the distinct locality, province and region labels.
    ///
    /// Returns `None` when all three are absent.
    #[must_use]
    pub fn compose_text(
        locality: Option<&str>,
        province: Option<&str>,
        region: Option<&str>,
    ) -> Option<String> {
        let mut segments: Vec<&str> = Vec::with_capacity(3);
        for segment in [locality, province, region].into_iter().flatten() {
            if !segment.is_empty() && !segments.contains(&segment) {
                segments.push(segment);
            }
        }
        if segments.is_empty() {
            None
        } else {
            Some(segments.join(", "))
        }
    }
}
