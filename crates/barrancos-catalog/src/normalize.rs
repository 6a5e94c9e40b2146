//! Text cleanup shared by every stage of the pipeline.
//!
//! Scraped names and descriptions arrive with collapsed word boundaries
//! (`"BarrancoDel Vero"`), glued parentheses and scraper boilerplate. These
//! helpers fix the spacing and tell real content apart from placeholders.

use serde_json::Value;

/// Lower-cased placeholder tokens that scrapes produce in place of content.
const PLACEHOLDERS: &[&str] = &[
    "approche:",
    "-canyon.com",
    "à la fiche-canyon",
    "info técnica",
    "descripciones",
    "tiempo descenso:",
    "tiempo retorno:",
    "tiempo aproximacion:",
    "no hay topos por el momento",
    "no hay imagenes",
    "localidad:",
    "region :",
    "région :",
    "massif",
    "?",
    "sin datos",
    "datos pendientes de revisión.",
];

/// Normalizes spacing in a scraped text field.
///
/// Collapses whitespace runs, trims, and inserts a space:
/// - after `)` when it is glued to the next character,
/// - between a lowercase and an uppercase letter (`a-z áéíóúñ` / `A-Z ÁÉÍÓÚÑ`),
/// - before `(` glued to a preceding letter.
///
/// The result is stable under repeated application.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let mut spaced = String::with_capacity(collapsed.len() + 8);
    let mut prev: Option<char> = None;

    for c in collapsed.chars() {
        if let Some(p) = prev {
            let glued_close = p == ')' && !c.is_whitespace();
            let camel_join = is_lower(p) && is_upper(c);
            let glued_open = is_letter(p) && c == '(';
            if glued_close || camel_join || glued_open {
                spaced.push(' ');
            }
        }
        spaced.push(c);
        prev = Some(c);
    }

    collapse_whitespace(&spaced)
}

/// Normalizes a raw JSON value.
///
/// Returns `None` for anything that is not a string, and for strings that
/// are blank after normalization.
#[must_use]
pub fn normalize_value(value: Option<&Value>) -> Option<String> {
    let normalized = normalize(value?.as_str()?);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Returns `true` if `value` carries real content rather than a known
/// placeholder token.
#[must_use]
pub fn is_meaningful(value: &str) -> bool {
    let normalized = normalize(value);
    if normalized.is_empty() {
        return false;
    }
    let lower = normalized.to_lowercase();
    !PLACEHOLDERS.contains(&lower.as_str())
}

/// Normalizes a raw JSON value and keeps it only if it is meaningful.
#[must_use]
pub fn meaningful_string(value: Option<&Value>) -> Option<String> {
    normalize_value(value).filter(|s| is_meaningful(s))
}

/// Picks the better of two optional text values.
///
/// Empty or placeholder values lose to meaningful ones; between two
/// meaningful values the longer one (by character count) wins; ties and
/// equal values keep `current`.
#[must_use]
pub fn better_string(current: Option<&str>, candidate: Option<&str>) -> Option<String> {
    let current_norm = current.map(normalize).filter(|s| !s.is_empty());
    let candidate_norm = candidate.map(normalize).filter(|s| !s.is_empty());

    let (cur, cand) = match (current_norm.as_deref(), candidate_norm.as_deref()) {
        (Some(cur), Some(cand)) => (cur, cand),
        (Some(_), None) => return current.map(str::to_owned),
        (None, Some(_)) => return candidate.map(str::to_owned),
        (None, None) => return None,
    };

    let pick_candidate = if cur == cand {
        false
    } else {
        match (is_meaningful(cur), is_meaningful(cand)) {
            (false, true) => true,
            (true, false) => false,
            _ => cand.chars().count() > cur.chars().count(),
        }
    };

    if pick_candidate {
        candidate.map(str::to_owned)
    } else {
        current.map(str::to_owned)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_lower(c: char) -> bool {
    c.is_ascii_lowercase() || matches!(c, 'á' | 'é' | 'í' | 'ó' | 'ú' | 'ñ')
}

fn is_upper(c: char) -> bool {
    c.is_ascii_uppercase() || matches!(c, 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'Ñ')
}

fn is_letter(c: char) -> bool {
    is_lower(c) || is_upper(c)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
