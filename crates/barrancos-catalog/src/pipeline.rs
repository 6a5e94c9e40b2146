//! Raw datasets in, ordered deduplicated catalog out.

use std::collections::HashMap;

use barrancos_core::CanonicalCanyon;
use serde_json::Value;

use crate::collate::spanish_cmp;
use crate::merge::merge_canyons;
use crate::project::project_record;

/// A raw dataset tagged with where it came from.
#[derive(Debug, Clone, Copy)]
pub struct RawSource<'a> {
    pub tag: &'a str,
    pub records: &'a [Value],
}

/// Builds the catalog from a single untagged dataset.
///
/// `null` entries are skipped. Records sharing an id are merged, and the
/// result is sorted by name.
#[must_use]
pub fn build_catalog(records: &[Value]) -> Vec<CanonicalCanyon> {
    build_catalog_from_sources(&[RawSource { tag: "", records }])
}

/// Builds the catalog from several datasets, concatenated in order.
///
/// Fallback ids (`canyon-{n}`) count non-null entries across all sources, so
/// they stay unique.
#[must_use]
pub fn build_catalog_from_sources(sources: &[RawSource<'_>]) -> Vec<CanonicalCanyon> {
    let mut catalog: Vec<CanonicalCanyon> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut index = 0usize;

    for source in sources {
        for raw in source.records.iter().filter(|raw| !raw.is_null()) {
            let canyon = project_record(raw, index, source.tag);
            index += 1;

            if let Some(&pos) = positions.get(&canyon.id) {
                tracing::debug!(id = %canyon.id, source = source.tag, "merging duplicate canyon");
                catalog[pos] = merge_canyons(&catalog[pos], &canyon);
            } else {
                positions.insert(canyon.id.clone(), catalog.len());
                catalog.push(canyon);
            }
        }
    }

    tracing::debug!(
        projected = index,
        unique = catalog.len(),
        "catalog assembled"
    );

    catalog.sort_by(|a, b| spanish_cmp(&a.name, &b.name));
    catalog
}

/// Looks up a canyon by exact id.
#[must_use]
pub fn find_canyon<'a>(catalog: &'a [CanonicalCanyon], id: &str) -> Option<&'a CanonicalCanyon> {
    catalog.iter().find(|canyon| canyon.id == id)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn duplicates_merge_into_first_position() {
        let records = vec![
            json!({"id": "a", "name": "Alfa"}),
            json!({"id": "b", "name": "Beta"}),
            json!({"id": "a", "name": "Alfa", "description": "Descripción larga del barranco"}),
        ];
        let catalog = build_catalog(&records);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].id, "a");
        assert_eq!(catalog[0].description, "Descripción larga del barranco");
    }

    #[test]
    fn null_entries_do_not_consume_positions() {
        let records = vec![json!(null), json!({"name": "Uno"}), json!(null), json!({"name": "Dos"})];
        let catalog = build_catalog(&records);
        let mut ids: Vec<_> = catalog.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["canyon-0", "canyon-1"]);
    }

    #[test]
    fn fallback_ids_continue_across_sources() {
        let first = vec![json!({"name": "Uno"})];
        let second = vec![json!({"name": "Dos"})];
        let catalog = build_catalog_from_sources(&[
            RawSource { tag: "one", records: &first },
            RawSource { tag: "two", records: &second },
        ]);
        let dos = catalog.iter().find(|c| c.name == "Dos").expect("Dos");
        assert_eq!(dos.id, "canyon-1");
        assert_eq!(dos.sources, vec!["two"]);
    }

    #[test]
    fn cross_source_duplicates_record_both_tags() {
        let first = vec![json!({"id": "x", "name": "Vero"})];
        let second = vec![json!({"id": "x", "name": "Vero", "coordinates": {"lat": 42.2, "lng": 0.1}})];
        let catalog = build_catalog_from_sources(&[
            RawSource { tag: "guara", records: &first },
            RawSource { tag: "descente", records: &second },
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].sources, vec!["guara", "descente"]);
        assert!(catalog[0].coordinates.is_some());
    }

    #[test]
    fn find_canyon_is_exact() {
        let catalog = build_catalog(&[json!({"id": "peonera"})]);
        assert!(find_canyon(&catalog, "peonera").is_some());
        assert!(find_canyon(&catalog, "Peonera").is_none());
    }

    #[test]
    fn empty_input_gives_empty_catalog() {
        assert!(build_catalog(&[]).is_empty());
    }
}
