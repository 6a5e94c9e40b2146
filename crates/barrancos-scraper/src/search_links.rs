//! Wikiloc search URLs built from canyon names, no network involved.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

pub const WIKILOC_BASE_URL: &str = "https://www.wikiloc.com";

/// Characters left unescaped in a URI component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a single URI component (query value or path segment).
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Wikiloc text search at `base` for `query`, filtered by activity when
/// `activity` is non-empty.
#[must_use]
pub fn search_url(base: &str, query: &str, activity: &str) -> String {
    let base = base.trim_end_matches('/');
    let mut url = format!("{base}/wikiloc/find.do?q={}", encode_component(query));
    if !activity.is_empty() {
        url.push_str("&act=");
        url.push_str(&encode_component(activity));
    }
    url
}

/// Public Wikiloc search URL for a canyon name and province.
#[must_use]
pub fn build_search_url(name: Option<&str>, province: Option<&str>, activity: &str) -> String {
    let query = [name, province]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    search_url(WIKILOC_BASE_URL, &query, activity)
}

/// Sets `wikiloc_search_url` on every object in `dataset`.
///
/// The query comes from `nombre`/`provincia`, falling back to
/// `name`/`province`. Non-object entries are left alone. Returns the number
/// of entries updated.
pub fn add_search_urls(dataset: &mut [Value], activity: &str) -> usize {
    let mut updated = 0;
    for item in dataset.iter_mut() {
        let Some(record) = item.as_object_mut() else {
            continue;
        };
        let text = |keys: [&str; 2]| {
            keys.iter()
                .find_map(|key| record.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .map(str::to_owned)
        };
        let name = text(["nombre", "name"]);
        let province = text(["provincia", "province"]);
        let url = build_search_url(name.as_deref(), province.as_deref(), activity);
        record.insert("wikiloc_search_url".to_owned(), Value::String(url));
        updated += 1;
    }
    updated
}
