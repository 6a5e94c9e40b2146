//! Location labels and location-free canyon names.
//!
//! Source names often repeat the location (`"Barranco de Fornocal (Huesca)"`).
//! The catalog keeps the bare name and a structured [`Location`] instead.

use std::sync::LazyLock;

use barrancos_core::{Location, RawRecord};
use regex::Regex;

use crate::normalize::{meaningful_string, normalize};

/// Every raw field that may hold a location label, in priority order.
const LOCATION_FIELDS: &[&str] = &[
    "localidad",
    "municipio",
    "municipality",
    "poblacion",
    "city",
    "provincia",
    "departamento",
    "department",
    "province",
    "region",
    "región",
    "zona",
    "pais",
    "country",
];

const LOCALITY_ALIASES: &[&str] = &["localidad", "municipio", "municipality", "poblacion", "city"];
const PROVINCE_ALIASES: &[&str] = &["provincia", "departamento", "department", "province"];
const REGION_ALIASES: &[&str] = &["region", "región", "zona"];
const COUNTRY_ALIASES: &[&str] = &["pais", "country"];

static ADMIN_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:provincia|departamento|département|region|región|région|comunidad|province|department|state|estado)\s+(?:de|of|du)\s+",
    )
    .expect("valid admin prefix regex")
});
static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthetical regex"));

/// Collects every meaningful location label on `record`.
///
/// Each label is followed by its prefix-stripped variant (`"Provincia de
/// Huesca"` → `"Huesca"`) when the two differ. Duplicates are dropped and
/// the first occurrence keeps its position.
#[must_use]
pub fn collect_location_parts(record: &RawRecord) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut push = |part: String| {
        if !part.is_empty() && !parts.contains(&part) {
            parts.push(part);
        }
    };

    for field in LOCATION_FIELDS {
        let Some(label) = meaningful_string(record.get(*field)) else {
            continue;
        };
        let simplified = strip_admin_prefix(&label);
        let differs = simplified != label;
        push(label);
        if differs {
            push(simplified);
        }
    }

    parts
}

/// Normalizes a label and drops a leading administrative prefix
/// (`"Región de Murcia"` → `"Murcia"`).
///
/// Returns `None` for absent or placeholder labels.
#[must_use]
pub fn simplify_location_label(value: Option<&serde_json::Value>) -> Option<String> {
    let meaningful = meaningful_string(value)?;
    let simplified = strip_admin_prefix(&meaningful);
    if simplified.is_empty() {
        Some(meaningful)
    } else {
        Some(simplified)
    }
}

/// Resolves the structured location of a raw record.
#[must_use]
pub fn resolve_location(record: &RawRecord) -> Location {
    let locality = LOCALITY_ALIASES
        .iter()
        .find_map(|field| meaningful_string(record.get(*field)));
    let province = first_label(record, PROVINCE_ALIASES);
    let region = first_label(record, REGION_ALIASES);
    let country = first_label(record, COUNTRY_ALIASES);
    let text = Location::compose_text(locality.as_deref(), province.as_deref(), region.as_deref());

    Location {
        locality,
        province,
        region,
        country,
        text,
    }
}

/// Removes location phrases that `record` also carries as structured fields.
///
/// For every collected location part, tries in order: the phrase followed by
/// a trailing parenthetical, a trailing parenthetical wrapping the phrase, the
/// bare phrase at the end, and the phrase as a whole word anywhere. Remaining
/// parenthetical content is then dropped. If nothing is left, the normalized
/// input name is returned unchanged.
#[must_use]
pub fn strip_location_from_name(name: &str, record: &RawRecord) -> String {
    let normalized_name = normalize(name);
    if normalized_name.is_empty() {
        return normalized_name;
    }

    let mut cleaned = normalized_name.clone();
    for part in collect_location_parts(record) {
        let escaped = regex::escape(&part);
        let patterns = [
            format!(r"(?i)\s+{escaped}\s*\(.*\)$"),
            format!(r"(?i)\s*\(\s*{escaped}\s*\)$"),
            format!(r"(?i)\s+{escaped}$"),
            format!(r"(?i)(?:^|\s){escaped}(?:\s|$)"),
        ];
        for pattern in &patterns {
            let Ok(re) = Regex::new(pattern) else {
                tracing::debug!(part = %part, "skipping unbuildable location pattern");
                continue;
            };
            cleaned = re.replace(&cleaned, " ").trim().to_owned();
        }
    }

    let without_parens = PARENTHETICAL_RE.replace_all(&cleaned, " ");
    let collapsed = normalize(&without_parens);
    if collapsed.is_empty() {
        normalized_name
    } else {
        collapsed
    }
}

fn first_label(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|field| simplify_location_label(record.get(*field)))
}

fn strip_admin_prefix(label: &str) -> String {
    ADMIN_PREFIX_RE.replace(label, "").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn collect_location_parts_adds_simplified_variants() {
        let rec = record(json!({
            "localidad": "Bierge",
            "provincia": "Provincia de Huesca",
            "region": "?",
            "pais": "España"
        }));
        assert_eq!(
            collect_location_parts(&rec),
            vec!["Bierge", "Provincia de Huesca", "Huesca", "España"]
        );
    }

    #[test]
    fn collect_location_parts_deduplicates() {
        let rec = record(json!({"provincia": "Huesca", "province": "Huesca", "zona": "Guara"}));
        assert_eq!(collect_location_parts(&rec), vec!["Huesca", "Guara"]);
    }

    #[test]
    fn simplify_location_label_strips_prefixes_in_several_languages() {
        assert_eq!(
            simplify_location_label(Some(&json!("Región de Murcia"))).as_deref(),
            Some("Murcia")
        );
        assert_eq!(
            simplify_location_label(Some(&json!("Département du Var"))).as_deref(),
            Some("Var")
        );
        assert_eq!(
            simplify_location_label(Some(&json!("State of Utah"))).as_deref(),
            Some("Utah")
        );
        assert_eq!(simplify_location_label(Some(&json!("région :"))), None);
    }

    #[test]
    fn resolve_location_follows_alias_priority() {
        let rec = record(json!({
            "municipio": "Rodellar",
            "departamento": "Huesca",
            "zona": "Sierra de Guara",
            "country": "España"
        }));
        let location = resolve_location(&rec);
        assert_eq!(location.locality.as_deref(), Some("Rodellar"));
        assert_eq!(location.province.as_deref(), Some("Huesca"));
        assert_eq!(location.region.as_deref(), Some("Sierra de Guara"));
        assert_eq!(location.country.as_deref(), Some("España"));
        assert_eq!(
            location.text.as_deref(),
            Some("Rodellar, Huesca, Sierra de Guara")
        );
    }

    #[test]
    fn resolve_location_empty_record_has_no_text() {
        let location = resolve_location(&RawRecord::new());
        assert_eq!(location, Location::default());
    }

    #[test]
    fn strip_removes_trailing_parenthetical_location() {
        let rec = record(json!({"province": "Huesca"}));
        assert_eq!(strip_location_from_name("Canyon Foo (Huesca)", &rec), "Canyon Foo");
    }

    #[test]
    fn strip_removes_phrase_followed_by_parenthetical() {
        let rec = record(json!({"localidad": "Bierge"}));
        assert_eq!(
            strip_location_from_name("Barranco del Puntillo Bierge (Huesca)", &rec),
            "Barranco del Puntillo"
        );
    }

    #[test]
    fn strip_removes_bare_trailing_phrase_case_insensitively() {
        let rec = record(json!({"provincia": "Huesca"}));
        assert_eq!(strip_location_from_name("Peonera HUESCA", &rec), "Peonera");
    }

    #[test]
    fn strip_removes_whole_word_occurrence_anywhere() {
        let rec = record(json!({"zona": "Guara"}));
        assert_eq!(
            strip_location_from_name("Mascún Guara Inferior", &rec),
            "Mascún Inferior"
        );
    }

    #[test]
    fn strip_does_not_cut_inside_words() {
        let rec = record(json!({"zona": "Vero"}));
        assert_eq!(
            strip_location_from_name("Barranco Verolo", &rec),
            "Barranco Verolo"
        );
    }

    #[test]
    fn strip_drops_leftover_parentheticals() {
        let rec = RawRecord::new();
        assert_eq!(
            strip_location_from_name("Gorgas Negras (integral)", &rec),
            "Gorgas Negras"
        );
    }

    #[test]
    fn strip_falls_back_when_name_is_only_location() {
        let rec = record(json!({"provincia": "Huesca"}));
        assert_eq!(strip_location_from_name("Huesca", &rec), "Huesca");
    }
}
