//! Wikiloc trail lookup for canyons without an approach track.
//!
//! Two strategies are tried in order: the JSON map endpoint, optionally
//! restricted to a bounding box around the canyon, then the HTML text search.

use std::collections::VecDeque;
use std::sync::LazyLock;
use std::time::Duration;

use barrancos_catalog::fields::parse_finite;
use barrancos_catalog::location::strip_location_from_name;
use barrancos_catalog::normalize::normalize_value;
use barrancos_core::RawRecord;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::Value;

use crate::client::{EnrichmentClient, HTML_ACCEPT, JSON_ACCEPT};
use crate::enrich::{pause, EnrichSummary};
use crate::error::ScraperError;
use crate::search_links::search_url;

const KM_PER_DEGREE: f64 = 111.32;
const MAP_REFERER: &str = "https://www.wikiloc.com/wikiloc/map.do";
const ORIGIN: &str = "https://www.wikiloc.com";

/// Object keys checked first when looking for a trail URL in JSON.
const URL_KEYS: &[&str] = &["url", "trailUrl", "trailURL", "permalink", "link", "href"];

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("valid anchor regex"));

/// How an anchor qualifies as a trail link in search results.
enum AnchorRule {
    Class(&'static str),
    HrefContains(&'static str),
}

/// Anchor rules in priority order.
const ANCHOR_RULES: &[AnchorRule] = &[
    AnchorRule::Class("trail-title"),
    AnchorRule::Class("trailTitle"),
    AnchorRule::Class("result-title"),
    AnchorRule::HrefContains("/canyoning-trails/"),
    AnchorRule::HrefContains("/trails/canyoning/"),
    AnchorRule::HrefContains("/trails/"),
];

/// Geographic search window around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box extending `radius_km` in every direction from `(lat, lng)`,
    /// clamped to valid latitude and longitude ranges.
    ///
    /// Returns `None` if any input is not finite.
    #[must_use]
    pub fn around(lat: f64, lng: f64, radius_km: f64) -> Option<Self> {
        if !(lat.is_finite() && lng.is_finite() && radius_km.is_finite()) {
            return None;
        }
        let lat_delta = radius_km / KM_PER_DEGREE;
        let lng_scale = lat.to_radians().cos() * KM_PER_DEGREE;
        let lng_delta = if lng_scale.abs() < f64::EPSILON {
            lat_delta
        } else {
            radius_km / lng_scale
        };

        Some(Self {
            min_lat: (lat - lat_delta).max(-90.0),
            min_lng: (lng - lng_delta).max(-180.0),
            max_lat: (lat + lat_delta).min(90.0),
            max_lng: (lng + lng_delta).min(180.0),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WikilocOptions {
    pub base_url: String,
    pub activity: String,
    /// `limit` parameter of the map endpoint.
    pub result_limit: u32,
    /// Search radius; falls back to the record's `coordinates.radiusKm`,
    /// then `default_radius_km`.
    pub radius_km: Option<f64>,
    pub default_radius_km: f64,
    /// Extra map endpoint parameters as `k=v&k2=v2`.
    pub map_params: Option<String>,
    pub use_map: bool,
    pub delay: Duration,
    /// Maximum number of records to process.
    pub limit: Option<usize>,
}

/// Where a trail link was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    Map,
    Html,
}

impl LinkSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LinkSource::Map => "map",
            LinkSource::Html => "html",
        }
    }
}

/// Extra request headers for a Wikiloc session: referer and origin, then the
/// user-supplied JSON headers, then the cookie.
#[must_use]
pub fn session_headers(cookie: Option<&str>, extra_json: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Referer".to_owned(), MAP_REFERER.to_owned()),
        ("Origin".to_owned(), ORIGIN.to_owned()),
    ];
    if let Some(raw) = extra_json {
        headers.extend(parse_extra_headers(raw));
    }
    if let Some(cookie) = cookie {
        headers.push(("Cookie".to_owned(), cookie.to_owned()));
    }
    headers
}

/// Parses a JSON object of header names to values. Non-string values are
/// rendered as JSON text. Anything other than an object is logged and
/// ignored.
#[must_use]
pub fn parse_extra_headers(raw: &str) -> Vec<(String, String)> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, value)
            })
            .collect(),
        Ok(_) => {
            tracing::warn!("extra Wikiloc headers are not a JSON object; ignoring");
            Vec::new()
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not parse extra Wikiloc headers; ignoring");
            Vec::new()
        }
    }
}

/// Search text for a record: its name without location phrases.
#[must_use]
pub fn build_query(item: &Value) -> Option<String> {
    let empty = RawRecord::new();
    let record = item.as_object().unwrap_or(&empty);
    let name = ["name", "nombre"]
        .iter()
        .find_map(|key| normalize_value(record.get(*key)))?;
    Some(strip_location_from_name(&name, record)).filter(|q| !q.is_empty())
}

/// Map endpoint URL for `query`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `base_url` cannot be parsed.
pub fn map_search_url(
    base_url: &str,
    query: &str,
    activity: &str,
    result_limit: u32,
    bbox: Option<&BoundingBox>,
    extra_params: Option<&str>,
) -> Result<String, ScraperError> {
    let endpoint = format!("{}/find.do", base_url.trim_end_matches('/'));
    let mut url = reqwest::Url::parse(&endpoint).map_err(|e| ScraperError::InvalidUrl {
        url: endpoint.clone(),
        reason: e.to_string(),
    })?;

    let mut params: Vec<(String, String)> = vec![
        ("event".to_owned(), "map".to_owned()),
        ("start".to_owned(), "0".to_owned()),
    ];
    if !activity.is_empty() {
        params.push(("act".to_owned(), activity.to_owned()));
    }
    params.push(("limit".to_owned(), result_limit.to_string()));
    params.push(("text".to_owned(), query.to_owned()));
    if let Some(bbox) = bbox {
        params.push(("minLat".to_owned(), format!("{:.6}", bbox.min_lat)));
        params.push(("minLng".to_owned(), format!("{:.6}", bbox.min_lng)));
        params.push(("maxLat".to_owned(), format!("{:.6}", bbox.max_lat)));
        params.push(("maxLng".to_owned(), format!("{:.6}", bbox.max_lng)));
    }
    for (key, value) in extra_params.map(parse_query_pairs).unwrap_or_default() {
        if value.is_empty() {
            continue;
        }
        match params.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => params.push((key, value)),
        }
    }

    url.query_pairs_mut().extend_pairs(params);
    Ok(url.to_string())
}

/// Decodes an `application/x-www-form-urlencoded` string into pairs.
fn parse_query_pairs(raw: &str) -> Vec<(String, String)> {
    let decode = |part: &str| {
        percent_decode_str(&part.replace('+', " "))
            .decode_utf8_lossy()
            .into_owned()
    };
    raw.trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

/// First absolute trail URL in a map endpoint answer, found breadth-first.
///
/// Within an object the well-known URL keys are checked before descending
/// into its values.
#[must_use]
pub fn first_trail_link_in_json(payload: &Value, base_url: &str) -> Option<String> {
    if !(payload.is_object() || payload.is_array()) {
        return None;
    }

    let mut queue: VecDeque<&Value> = VecDeque::from([payload]);
    while let Some(current) = queue.pop_front() {
        match current {
            Value::String(s) => {
                if let Some(url) = trail_url(s, base_url) {
                    return Some(url);
                }
            }
            Value::Array(items) => queue.extend(items),
            Value::Object(map) => {
                let keyed = URL_KEYS
                    .iter()
                    .filter_map(|key| map.get(*key).and_then(Value::as_str))
                    .find_map(|s| trail_url(s, base_url));
                if keyed.is_some() {
                    return keyed;
                }
                queue.extend(map.values());
            }
            _ => {}
        }
    }
    None
}

/// First trail link in a search results page, following the anchor rules in
/// priority order.
#[must_use]
pub fn first_trail_link_in_html(html: &str, base_url: &str) -> Option<String> {
    let anchors: Vec<&str> = ANCHOR_RE.find_iter(html).map(|m| m.as_str()).collect();
    let base = base_url.trim_end_matches('/');

    for rule in ANCHOR_RULES {
        let Some(anchor) = anchors.iter().find(|tag| anchor_matches(tag, rule)) else {
            continue;
        };
        let Some(href) = extract_attr(anchor, "href") else {
            continue;
        };
        let href = href.replace("&amp;", "&");
        if href.starts_with("http") {
            return Some(href);
        }
        let separator = if href.starts_with('/') { "" } else { "/" };
        return Some(format!("{base}{separator}{href}"));
    }
    None
}

/// Looks up a trail link for one record.
///
/// A failing map endpoint is logged and the HTML search is used instead.
///
/// # Errors
///
/// Returns the HTML search request error, if that request fails.
pub async fn find_trail_link(
    client: &EnrichmentClient,
    item: &Value,
    query: &str,
    options: &WikilocOptions,
) -> Result<Option<(String, LinkSource)>, ScraperError> {
    if options.use_map {
        match lookup_map(client, item, query, options).await {
            Ok(Some(link)) => return Ok(Some((link, LinkSource::Map))),
            Ok(None) => {}
            Err(err) => tracing::warn!(query, error = %err, "map endpoint failed; trying text search"),
        }
    }

    let url = search_url(&options.base_url, query, &options.activity);
    let html = client.fetch_text(&url, HTML_ACCEPT).await?;
    Ok(first_trail_link_in_html(&html, &options.base_url).map(|link| (link, LinkSource::Html)))
}

/// Sets `wikiloc_aproximacion` on records that have no approach link yet.
///
/// Records are processed sequentially with `options.delay` between them.
/// Lookup failures are logged and skipped.
pub async fn enrich_wikiloc_links(
    client: &EnrichmentClient,
    dataset: &mut [Value],
    options: &WikilocOptions,
) -> EnrichSummary {
    let mut summary = EnrichSummary::default();
    let total = dataset.len();

    for item in dataset.iter_mut() {
        if options.limit.is_some_and(|limit| summary.processed >= limit) {
            break;
        }
        summary.processed += 1;

        if has_approach_link(item) {
            continue;
        }
        let Some(query) = build_query(item) else {
            tracing::warn!(position = summary.processed, "record has no name to search for");
            continue;
        };

        tracing::info!(query = %query, "searching Wikiloc");
        match find_trail_link(client, item, &query, options).await {
            Ok(Some((link, source))) => {
                tracing::info!(query = %query, link = %link, source = source.as_str(), "trail found");
                if let Some(record) = item.as_object_mut() {
                    record.insert("wikiloc_aproximacion".to_owned(), Value::String(link));
                    summary.updated += 1;
                }
            }
            Ok(None) => tracing::warn!(query = %query, "no trail link found"),
            Err(err) => tracing::error!(query = %query, error = %err, "Wikiloc lookup failed"),
        }

        pause(options.delay, summary.processed < total).await;
    }

    summary
}

async fn lookup_map(
    client: &EnrichmentClient,
    item: &Value,
    query: &str,
    options: &WikilocOptions,
) -> Result<Option<String>, ScraperError> {
    let coordinates = item.get("coordinates");
    let bbox = coordinates.and_then(|coords| {
        let radius = options
            .radius_km
            .or_else(|| parse_finite(coords.get("radiusKm")))
            .unwrap_or(options.default_radius_km);
        BoundingBox::around(
            parse_finite(coords.get("lat"))?,
            parse_finite(coords.get("lng"))?,
            radius,
        )
    });

    let url = map_search_url(
        &options.base_url,
        query,
        &options.activity,
        options.result_limit,
        bbox.as_ref(),
        options.map_params.as_deref(),
    )?;
    let body = client.fetch_text(&url, JSON_ACCEPT).await?;
    let Ok(payload) = serde_json::from_str::<Value>(&body) else {
        tracing::debug!(query, "map endpoint answered with non-JSON body");
        return Ok(None);
    };
    Ok(first_trail_link_in_json(&payload, &options.base_url))
}

fn has_approach_link(item: &Value) -> bool {
    let truthy = |value: Option<&Value>| match value {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null | Value::Bool(false)) | None => false,
        Some(_) => true,
    };
    truthy(item.get("wikiloc_aproximacion"))
        || truthy(item.get("wikiloc_approach"))
        || truthy(item.get("wikiloc").and_then(|w| w.get("approach")))
}

fn trail_url(candidate: &str, base_url: &str) -> Option<String> {
    let absolute = absolute_url(candidate.trim(), base_url)?;
    absolute
        .to_ascii_lowercase()
        .contains("/trail")
        .then_some(absolute)
}

fn absolute_url(value: &str, base_url: &str) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Some(value.to_owned())
    } else if let Some(rest) = value.strip_prefix("//") {
        Some(format!("https://{rest}"))
    } else if value.starts_with('/') {
        Some(format!("{}{value}", base_url.trim_end_matches('/')))
    } else {
        None
    }
}

fn anchor_matches(tag: &str, rule: &AnchorRule) -> bool {
    match rule {
        AnchorRule::Class(class) => extract_attr(tag, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == *class)),
        AnchorRule::HrefContains(fragment) => {
            extract_attr(tag, "href").is_some_and(|href| href.contains(fragment))
        }
    }
}

fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!(r#"(?is)\s{}\s*=\s*["']([^"']+)["']"#, regex::escape(attr));
    let re = Regex::new(&pattern).ok()?;
    re.captures(tag)
        .and_then(|c| c.get(1).map(|m| m.as_str().trim().to_owned()))
}

#[cfg(test)]
#[path = "wikiloc_test.rs"]
mod tests;
