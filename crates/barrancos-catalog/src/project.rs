//! Projection from raw dataset entries to [`CanonicalCanyon`].
//!
//! Every field resolves through an ordered alias list (see [`crate::fields`]).
//! Projection never fails: missing or malformed input degrades to `None`,
//! `0`, or a sentinel string.

use std::sync::LazyLock;

use barrancos_core::{CanonicalCanyon, Coordinates, RawRecord, WikilocLinks, NO_DATA};
use regex::Regex;
use serde_json::Value;

use crate::difficulty::{axis_grade, extract_component, format_difficulty, GradeAxis};
use crate::fields::{first_normalized, first_value, nested, parse_finite, round2};
use crate::location::{resolve_location, strip_location_from_name};
use crate::normalize::{is_meaningful, normalize, normalize_value};

/// Name used when a record has no usable name at all.
pub const UNNAMED: &str = "Barranco sin nombre";
/// Summary used when no summary fields are meaningful.
pub const SUMMARY_PENDING: &str = "Datos pendientes de revisión.";
/// Map zoom used when a record has coordinates but no zoom level.
pub const DEFAULT_ZOOM: f64 = 13.0;

const NAME_ALIASES: &[&str] = &["name", "nombre"];
const DIFFICULTY_ALIASES: &[&str] = &["difficulty", "grado_VA", "dificultad"];
const VERTICAL_ALIASES: &[&str] = &["dificultad_vertical", "difficulty_vertical"];
const AQUATIC_ALIASES: &[&str] = &["dificultad_acuatica", "difficulty_aquatic"];
const DESCRIPTION_ALIASES: &[&str] = &["description", "resumen", "descripcion", "descripcion_corta"];
const RAPPEL_ALIASES: &[&str] = &["rappel_mas_largo", "rapel_maximo"];
const GEAR_TEXT_ALIASES: &[&str] = &["material", "material_recomendado"];
const APPROACH_ALIASES: &[&str] = &["wikiloc_aproximacion", "wikiloc_approach", "enlace_aproximacion"];
const RETURN_ALIASES: &[&str] = &["wikiloc_retorno", "wikiloc_return", "enlace_retorno"];
const RATING_AVERAGE_ALIASES: &[&str] = &["rating_average", "ratingAverage"];
const RATING_VOTES_ALIASES: &[&str] = &["rating_votes", "ratingVotes"];

/// Summary parts: (label, aliases).
const SUMMARY_FIELDS: &[(&str, &[&str])] = &[
    ("Rappel máx", RAPPEL_ALIASES),
    ("Desnivel", &["desnivel_acumulado"]),
    (
        "Aproximación",
        &["tiempo_aproximado_aproximacion", "tiempo_aproximacion"],
    ),
    ("Descenso", &["tiempo_aproximado_barranco", "tiempo_descenso"]),
    ("Retorno", &["tiempo_aproximado_retorno", "tiempo_retorno"]),
];

static RAPPEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+[.,]?\d*)\s*(?:m|metros?)").expect("valid rappel length regex")
});

/// Projects one raw entry into the canonical shape.
///
/// `index` is the entry's position among the non-null entries of the input
/// and backs the positional fallback id. `source` tags the dataset the entry
/// came from; an empty tag is not recorded.
#[must_use]
pub fn project_record(raw: &Value, index: usize, source: &str) -> CanonicalCanyon {
    let empty = RawRecord::new();
    let record = raw.as_object().unwrap_or(&empty);

    let id = resolve_id(record, index);

    let name = first_normalized(record, NAME_ALIASES)
        .map(|base| strip_location_from_name(&base, record))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNNAMED.to_owned());

    let difficulty = format_difficulty(
        first_normalized(record, DIFFICULTY_ALIASES)
            .as_deref()
            .unwrap_or(NO_DATA),
    );
    let difficulty_vertical = axis_field(record, VERTICAL_ALIASES, GradeAxis::Vertical)
        .or_else(|| extract_component(&difficulty, GradeAxis::Vertical));
    let difficulty_aquatic = axis_field(record, AQUATIC_ALIASES, GradeAxis::Aquatic)
        .or_else(|| extract_component(&difficulty, GradeAxis::Aquatic));

    let summary = first_normalized(record, &["summary"]).unwrap_or_else(|| build_summary(record));
    let description = first_normalized(record, DESCRIPTION_ALIASES).unwrap_or_else(|| summary.clone());

    let mut gear = parse_gear(record);
    let max_rappel_meters = RAPPEL_ALIASES
        .iter()
        .find_map(|alias| extract_max_rappel_meters(record.get(*alias)));
    if let Some(meters) = max_rappel_meters {
        push_unique(&mut gear, rope_gear_label(meters));
    }

    let (rating_average, rating_votes) = parse_rating(record);

    let wikiloc = WikilocLinks {
        approach: link(record, "approach", APPROACH_ALIASES),
        return_: link(record, "return", RETURN_ALIASES),
    };
    let wikiloc_search_url = record
        .get("wikiloc_search_url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    let sources = if source.is_empty() {
        Vec::new()
    } else {
        vec![source.to_owned()]
    };

    CanonicalCanyon {
        id,
        name,
        difficulty,
        difficulty_vertical,
        difficulty_aquatic,
        description,
        summary,
        gear,
        max_rappel_meters,
        rating_average,
        rating_votes,
        wikiloc,
        wikiloc_search_url,
        coordinates: parse_coordinates(record),
        location: resolve_location(record),
        sources,
    }
}

/// Resolves the record identity: explicit id, then the last path segment of
/// `url`, then `canyon-{index}`.
fn resolve_id(record: &RawRecord, index: usize) -> String {
    let explicit = match record.get("id") {
        Some(Value::Number(n)) => Some(n.to_string()),
        other => normalize_value(other),
    };

    explicit
        .or_else(|| {
            let url = record.get("url").and_then(Value::as_str)?;
            if url.contains("://") {
                derive_id_from_url(url)
            } else {
                Some(normalize(url)).filter(|id| !id.is_empty())
            }
        })
        .unwrap_or_else(|| {
            tracing::debug!(index, "record has no id or url; using positional id");
            format!("canyon-{index}")
        })
}

/// Returns the last non-empty path segment of an absolute URL.
///
/// Relative or scheme-less strings are not treated as URLs.
#[must_use]
pub fn derive_id_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.trim().split_once("://")?;
    let path = rest.split_once('/').map_or("", |(_, path)| path);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(normalize)
        .filter(|segment| !segment.is_empty())
}

/// Builds a one-line summary from rappel, drop and timing fields.
#[must_use]
pub fn build_summary(record: &RawRecord) -> String {
    let parts: Vec<String> = SUMMARY_FIELDS
        .iter()
        .filter_map(|(label, aliases)| {
            first_normalized(record, aliases)
                .filter(|value| is_meaningful(value))
                .map(|value| format!("{label}: {value}"))
        })
        .collect();

    if parts.is_empty() {
        SUMMARY_PENDING.to_owned()
    } else {
        parts.join(" · ")
    }
}

/// Reads the gear list from a `gear` array or a delimited `material` string.
///
/// Entries are normalized and deduplicated case-insensitively.
#[must_use]
pub fn parse_gear(record: &RawRecord) -> Vec<String> {
    let entries: Vec<String> = if let Some(Value::Array(items)) = record.get("gear") {
        items
            .iter()
            .filter_map(|item| normalize_value(Some(item)))
            .collect()
    } else if let Some(text) = GEAR_TEXT_ALIASES
        .iter()
        .find_map(|alias| record.get(*alias).and_then(Value::as_str))
    {
        text.split([',', '\n', '·', ';'])
            .map(normalize)
            .filter(|entry| !entry.is_empty())
            .collect()
    } else {
        Vec::new()
    };

    let mut gear = Vec::with_capacity(entries.len());
    for entry in entries {
        push_unique(&mut gear, entry);
    }
    gear
}

/// Extracts a rappel length in meters from text such as `"35 m"` or
/// `"12,5 metros"`. JSON numbers are taken as meters directly.
#[must_use]
pub fn extract_max_rappel_meters(value: Option<&Value>) -> Option<f64> {
    let meters = match value? {
        Value::String(text) => {
            let caps = RAPPEL_RE.captures(text)?;
            caps.get(1)?.as_str().replace(',', ".").parse::<f64>().ok()
        }
        Value::Number(n) => n.as_f64(),
        _ => None,
    }?;
    meters.is_finite().then_some(meters)
}

/// Gear entry describing the two ropes needed for the longest rappel.
#[must_use]
pub fn rope_gear_label(meters: f64) -> String {
    let rounded = if meters.fract().abs() < f64::EPSILON {
        meters
    } else {
        (meters * 10.0).round() / 10.0
    };
    format!("2 cuerdas de {rounded} m")
}

fn push_unique(gear: &mut Vec<String>, entry: String) {
    let lower = entry.to_lowercase();
    if !gear.iter().any(|existing| existing.to_lowercase() == lower) {
        gear.push(entry);
    }
}

fn axis_field(record: &RawRecord, aliases: &[&str], axis: GradeAxis) -> Option<String> {
    aliases
        .iter()
        .find_map(|alias| axis_grade(record.get(*alias), axis))
}

fn link(record: &RawRecord, nested_key: &str, flat_aliases: &[&str]) -> Option<String> {
    normalize_value(nested(record, "wikiloc", nested_key))
        .or_else(|| first_normalized(record, flat_aliases))
}

fn parse_coordinates(record: &RawRecord) -> Option<Coordinates> {
    let object = record.get("coordinates")?.as_object()?;
    let lat = parse_finite(object.get("lat"))?;
    let lng = parse_finite(object.get("lng"))?;
    let zoom = parse_finite(object.get("zoom")).unwrap_or(DEFAULT_ZOOM);
    Some(Coordinates { lat, lng, zoom })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to [0, u32::MAX] first
fn parse_rating(record: &RawRecord) -> (Option<f64>, u32) {
    let average = parse_finite(first_value(record, RATING_AVERAGE_ALIASES)).map(round2);
    let votes = parse_finite(first_value(record, RATING_VOTES_ALIASES))
        .map_or(0, |v| v.round().clamp(0.0, f64::from(u32::MAX)) as u32);
    (average, votes)
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
