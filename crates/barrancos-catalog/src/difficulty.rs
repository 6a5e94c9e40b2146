//! Difficulty grade parsing.
//!
//! Canyon grades combine a vertical component (`V1`–`V7`) and an aquatic
//! component (`A1`–`A7`), often written loosely: `"v3a2"`, `"A2 V3"`,
//! `"V 3, A 2 (III)"`. Output is always `"V{n} A{n}"` in that order.

use std::sync::LazyLock;

use barrancos_core::NO_DATA;
use regex::Regex;
use serde_json::Value;

use crate::normalize::{is_meaningful, normalize};

static VERTICAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)V\s*([0-9]+(?:[.,][0-9]+)?)").expect("valid vertical grade regex")
});
static AQUATIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)A\s*([0-9]+(?:[.,][0-9]+)?)").expect("valid aquatic grade regex")
});
// `\b` is Unicode-aware, so letters next to accented characters are not
// mistaken for numerals.
static ROMAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[IVXLCDM]+\b").expect("valid roman numeral regex"));
static BARE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:[.,][0-9]+)?$").expect("valid number regex"));

/// One of the two graded dimensions of a canyon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeAxis {
    Vertical,
    Aquatic,
}

impl GradeAxis {
    #[must_use]
    pub fn prefix(self) -> char {
        match self {
            GradeAxis::Vertical => 'V',
            GradeAxis::Aquatic => 'A',
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            GradeAxis::Vertical => &VERTICAL_RE,
            GradeAxis::Aquatic => &AQUATIC_RE,
        }
    }
}

/// Extracts the first grade token for `axis` from free text.
///
/// Matching is case-insensitive and tolerates whitespace between the prefix
/// and the number; a `,` decimal separator is rewritten to `.`.
///
/// Returns `None` when no token is present.
#[must_use]
pub fn extract_component(text: &str, axis: GradeAxis) -> Option<String> {
    let caps = axis.pattern().captures(text)?;
    let number = caps.get(1)?.as_str().replace(',', ".");
    Some(format!("{}{number}", axis.prefix()))
}

/// Formats a free-text difficulty into the canonical grade expression.
///
/// - Empty or placeholder input yields [`NO_DATA`].
/// - If any grade token is found, returns the vertical then aquatic tokens
///   joined by a space.
/// - Otherwise returns the upper-cased text with Roman-numeral tokens and
///   parentheses removed, or [`NO_DATA`] if nothing is left.
#[must_use]
pub fn format_difficulty(text: &str) -> String {
    let normalized = normalize(text);
    if !is_meaningful(&normalized) {
        return NO_DATA.to_owned();
    }

    let upper = normalized.to_uppercase();
    let components: Vec<String> = [GradeAxis::Vertical, GradeAxis::Aquatic]
        .into_iter()
        .filter_map(|axis| extract_component(&upper, axis))
        .collect();
    if !components.is_empty() {
        return components.join(" ");
    }

    let without_romans = ROMAN_RE.replace_all(&upper, " ");
    let cleaned = without_romans
        .replace(['(', ')'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        NO_DATA.to_owned()
    } else {
        cleaned
    }
}

/// Resolves a dedicated per-axis raw field into a grade token.
///
/// Accepts a token (`"v4"`, `"A 3"`), a bare number (`"4"`, `4`) which gets
/// the axis prefix, or anything else, which yields `None`.
#[must_use]
pub fn axis_grade(raw: Option<&Value>, axis: GradeAxis) -> Option<String> {
    match raw? {
        Value::String(s) => {
            let normalized = normalize(s);
            extract_component(&normalized, axis).or_else(|| {
                BARE_NUMBER_RE
                    .is_match(&normalized)
                    .then(|| format!("{}{}", axis.prefix(), normalized.replace(',', ".")))
            })
        }
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| format!("{}{v}", axis.prefix())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extract_component_finds_vertical_token() {
        assert_eq!(
            extract_component("v3a2", GradeAxis::Vertical).as_deref(),
            Some("V3")
        );
    }

    #[test]
    fn extract_component_normalizes_comma_decimal() {
        assert_eq!(
            extract_component("A 2,5", GradeAxis::Aquatic).as_deref(),
            Some("A2.5")
        );
    }

    #[test]
    fn extract_component_absent_returns_none() {
        assert!(extract_component("Sin grado", GradeAxis::Vertical).is_none());
    }

    #[test]
    fn format_difficulty_orders_vertical_first() {
        assert_eq!(format_difficulty("v3a2"), "V3 A2");
        assert_eq!(format_difficulty("a2 v3"), "V3 A2");
        assert_eq!(format_difficulty("A2 V3 (III)"), "V3 A2");
    }

    #[test]
    fn format_difficulty_single_component() {
        assert_eq!(format_difficulty("v4"), "V4");
        assert_eq!(format_difficulty("A1"), "A1");
    }

    #[test]
    fn format_difficulty_placeholder_is_no_data() {
        assert_eq!(format_difficulty(""), NO_DATA);
        assert_eq!(format_difficulty("   "), NO_DATA);
        assert_eq!(format_difficulty("sin datos"), NO_DATA);
        assert_eq!(format_difficulty("?"), NO_DATA);
    }

    #[test]
    fn format_difficulty_strips_roman_numerals_in_fallback() {
        assert_eq!(format_difficulty("Media (III)"), "MEDIA");
        assert_eq!(format_difficulty("(IV)"), NO_DATA);
    }

    #[test]
    fn roman_letters_inside_accented_words_are_kept() {
        assert_eq!(format_difficulty("Difícil"), "DIFÍCIL");
        assert_eq!(format_difficulty("Difícil (II)"), "DIFÍCIL");
        assert_eq!(format_difficulty("Vías cortas"), "VÍAS CORTAS");
    }

    #[test]
    fn format_difficulty_is_stable_on_its_output() {
        for input in ["v3a2", "Media (III)", "", "a 2,5 v 4"] {
            let once = format_difficulty(input);
            assert_eq!(format_difficulty(&once), once, "unstable for {input:?}");
        }
    }

    #[test]
    fn axis_grade_accepts_tokens_and_numbers() {
        assert_eq!(
            axis_grade(Some(&json!("v4")), GradeAxis::Vertical).as_deref(),
            Some("V4")
        );
        assert_eq!(
            axis_grade(Some(&json!("3")), GradeAxis::Aquatic).as_deref(),
            Some("A3")
        );
        assert_eq!(
            axis_grade(Some(&json!(2)), GradeAxis::Aquatic).as_deref(),
            Some("A2")
        );
    }

    #[test]
    fn axis_grade_rejects_unusable_values() {
        assert!(axis_grade(Some(&json!("alto")), GradeAxis::Vertical).is_none());
        assert!(axis_grade(Some(&json!(null)), GradeAxis::Vertical).is_none());
        assert!(axis_grade(None, GradeAxis::Vertical).is_none());
    }
}
