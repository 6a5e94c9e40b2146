//! Reconciliation of two canonical records that share an id.
//!
//! `first` is the record already in the catalog, `second` the newcomer.
//! Identity fields come from `second`; descriptive fields keep whichever side
//! is more informative.

use barrancos_core::{CanonicalCanyon, Location, WikilocLinks};

use crate::difficulty::{extract_component, format_difficulty, GradeAxis};
use crate::fields::round2;
use crate::normalize::better_string;

/// Merges two records with the same id into one.
#[must_use]
pub fn merge_canyons(first: &CanonicalCanyon, second: &CanonicalCanyon) -> CanonicalCanyon {
    let difficulty = format_difficulty(
        better_string(Some(&first.difficulty), Some(&second.difficulty))
            .as_deref()
            .unwrap_or_default(),
    );
    let difficulty_vertical = merge_axis(
        first.difficulty_vertical.as_deref(),
        second.difficulty_vertical.as_deref(),
        &difficulty,
        GradeAxis::Vertical,
    );
    let difficulty_aquatic = merge_axis(
        first.difficulty_aquatic.as_deref(),
        second.difficulty_aquatic.as_deref(),
        &difficulty,
        GradeAxis::Aquatic,
    );

    let (rating_average, rating_votes) = merge_rating(first, second);

    let gear = if first.gear.len() >= second.gear.len() {
        first.gear.clone()
    } else {
        second.gear.clone()
    };

    let mut sources = first.sources.clone();
    for source in &second.sources {
        if !sources.contains(source) {
            sources.push(source.clone());
        }
    }

    CanonicalCanyon {
        id: second.id.clone(),
        name: second.name.clone(),
        difficulty,
        difficulty_vertical,
        difficulty_aquatic,
        description: better_string(Some(&first.description), Some(&second.description))
            .unwrap_or_default(),
        summary: better_string(Some(&first.summary), Some(&second.summary)).unwrap_or_default(),
        gear,
        max_rappel_meters: second
            .max_rappel_meters
            .filter(|m| m.is_finite())
            .or_else(|| first.max_rappel_meters.filter(|m| m.is_finite())),
        rating_average,
        rating_votes,
        wikiloc: WikilocLinks {
            approach: second
                .wikiloc
                .approach
                .clone()
                .or_else(|| first.wikiloc.approach.clone()),
            return_: second
                .wikiloc
                .return_
                .clone()
                .or_else(|| first.wikiloc.return_.clone()),
        },
        wikiloc_search_url: second
            .wikiloc_search_url
            .clone()
            .or_else(|| first.wikiloc_search_url.clone()),
        coordinates: second.coordinates.or(first.coordinates),
        location: merge_location(&first.location, &second.location),
        sources,
    }
}

fn merge_axis(
    first: Option<&str>,
    second: Option<&str>,
    merged_difficulty: &str,
    axis: GradeAxis,
) -> Option<String> {
    better_string(first, second)
        .and_then(|better| extract_component(&better, axis))
        .or_else(|| extract_component(merged_difficulty, axis))
        .or_else(|| first.or(second).map(str::to_owned))
}

/// Vote-weighted mean of both averages. A side with votes but no average
/// contributes zero to the score.
fn merge_rating(first: &CanonicalCanyon, second: &CanonicalCanyon) -> (Option<f64>, u32) {
    let total_votes = first.rating_votes.saturating_add(second.rating_votes);
    if total_votes == 0 {
        return (first.rating_average.or(second.rating_average), 0);
    }

    let score = first.rating_average.unwrap_or(0.0) * f64::from(first.rating_votes)
        + second.rating_average.unwrap_or(0.0) * f64::from(second.rating_votes);
    (Some(round2(score / f64::from(total_votes))), total_votes)
}

fn merge_location(first: &Location, second: &Location) -> Location {
    let locality = better_string(first.locality.as_deref(), second.locality.as_deref());
    let province = better_string(first.province.as_deref(), second.province.as_deref());
    let region = better_string(first.region.as_deref(), second.region.as_deref());
    let country = better_string(first.country.as_deref(), second.country.as_deref());
    let text = Location::compose_text(locality.as_deref(), province.as_deref(), region.as_deref());

    Location {
        locality,
        province,
        region,
        country,
        text,
    }
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
