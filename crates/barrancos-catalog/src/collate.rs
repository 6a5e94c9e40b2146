//! Spanish name ordering for the exported catalog.
//!
//! Primary-strength collation: case and accents are ignored (`"Ésera"` ==
//! `"esera"`), except that `ñ` is its own letter sorting between `n` and `o`.
//! Whitespace sorts before punctuation and symbols, which sort before digits,
//! which sort before letters. Ligatures expand (`æ` as `ae`, `œ` as `oe`,
//! `ß` as `ss`).

use std::cmp::Ordering;

/// Punctuation and symbols in collation order. Anything else that is neither
/// alphanumeric nor whitespace sorts after these by code point.
const PUNCTUATION_ORDER: &str = "_-\u{2010}\u{2011}\u{2013}\u{2014},;:!¡?¿.…'‘’‚\"“”„«»‹›()[]{}§¶@*/\\&#%‰†‡•`´˜^¯¨°©®+±÷×<=>¬|¦~¤¢$£¥€";
const UNRANKED_PUNCTUATION: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Space,
    Punctuation,
    Digit,
    Letter,
}

/// Compares two names with Spanish base-letter collation.
#[must_use]
pub fn spanish_cmp(a: &str, b: &str) -> Ordering {
    collation_weights(a).cmp(collation_weights(b))
}

fn collation_weights(s: &str) -> impl Iterator<Item = (Class, u32)> + '_ {
    s.chars()
        .flat_map(char::to_lowercase)
        .flat_map(|c| {
            let (first, second) = expand(c);
            std::iter::once(first).chain(second)
        })
        .map(primary_weight)
}

fn primary_weight(c: char) -> (Class, u32) {
    if c.is_whitespace() {
        return (Class::Space, 0);
    }
    if c.is_numeric() {
        return (Class::Digit, c.to_digit(10).unwrap_or(10 + u32::from(c)));
    }
    if c.is_alphabetic() {
        let weight = match c {
            'ñ' => u32::from('n') * 2 + 1,
            base => u32::from(base) * 2,
        };
        return (Class::Letter, weight);
    }
    let rank = PUNCTUATION_ORDER
        .chars()
        .position(|p| p == c)
        .and_then(|pos| u32::try_from(pos).ok())
        .unwrap_or(UNRANKED_PUNCTUATION + u32::from(c));
    (Class::Punctuation, rank)
}

/// Folds a lowercase character to its base letter, splitting ligatures.
fn expand(c: char) -> (char, Option<char>) {
    match c {
        'æ' => ('a', Some('e')),
        'œ' => ('o', Some('e')),
        'ß' => ('s', Some('s')),
        other => (fold_accent(other), None),
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ª' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'ē' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'ī' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' | 'º' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ç' => 'c',
        'ł' => 'l',
        other => other,
    }
}
