//! List-view rows derived from a result set.

use talkmap_core::{format_distance, GeoPoint, SearchResult, TransitInfo};

use crate::navigation::NavigationTarget;

/// One row of the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// 1-based position in the ranked result set.
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub distance: String,
    /// e.g. `320米（陆家嘴 2号线）`
    pub transit: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub navigation: NavigationTarget,
}

/// Turns ranked results into list rows. Order is kept exactly as given.
#[must_use]
pub fn present(results: &[SearchResult], reference: GeoPoint) -> Vec<ResultRow> {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| ResultRow {
            rank: i + 1,
            id: result.id.clone(),
            name: result.name.clone(),
            category: result.category.clone(),
            address: result.address.clone(),
            distance: format_distance(result.distance),
            transit: result.nearest_transit.as_ref().map(transit_line),
            phone: result.phone.clone(),
            rating: result.rating,
            navigation: NavigationTarget::walking(reference, result.location, &result.name),
        })
        .collect()
}

fn transit_line(transit: &TransitInfo) -> String {
    let station = match &transit.line {
        Some(line) => format!("{} {line}", transit.name),
        None => transit.name.clone(),
    };
    format!("{}（{station}）", format_distance(transit.distance))
}
