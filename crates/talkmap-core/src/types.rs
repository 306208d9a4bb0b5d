//! Parsed query intents and ranked search results.
//!
//! [`QueryIntent`] is what the parsing collaborator extracted from free text;
//! [`SearchResult`] is one ranked place returned by the search collaborator.
//! Both are immutable once built and are shared by every view of a session.

use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::GeoPoint;

/// Canned queries offered when nothing has been searched yet.
pub const SAMPLE_QUERIES: &[&str] = &[
    "东方明珠塔附近1公里内的星巴克",
    "北京天安门周边3公里内的地铁站",
    "上海外滩5公里内的川菜馆",
];

// ---------------------------------------------------------------------------
// Sorting and proximity labels
// ---------------------------------------------------------------------------

/// Broad ordering requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Distance,
    Rating,
    /// Closest to a transit station rather than to the user.
    TransitProximity,
    Other,
}

/// Sort label exactly as the parser produced it (e.g. `"距离地铁站最近"`).
///
/// The label is forwarded verbatim to the search collaborator, which matches
/// on its text; [`SortBy::key`] classifies it for local display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortBy(String);

impl SortBy {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn key(&self) -> SortKey {
        let label = self.0.to_lowercase();
        if is_transit_label(&label) {
            SortKey::TransitProximity
        } else if label.contains("rating") || label.contains("评分") {
            SortKey::Rating
        } else if label.contains("distance") || label.contains("距离") || label.contains("最近")
        {
            SortKey::Distance
        } else {
            SortKey::Other
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProximityKind {
    Transit,
    Other,
}

/// Kind of place the results should be near (e.g. `"地铁站"`), verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proximity(String);

impl Proximity {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn kind(&self) -> ProximityKind {
        if is_transit_label(&self.0.to_lowercase()) {
            ProximityKind::Transit
        } else {
            ProximityKind::Other
        }
    }
}

fn is_transit_label(lowercased: &str) -> bool {
    lowercased.contains("地铁") || lowercased.contains("subway") || lowercased.contains("transit")
}

// ---------------------------------------------------------------------------
// QueryIntent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filters {
    /// Explicit place named in the query; supersedes the reference location.
    pub location: Option<GeoPoint>,
    pub brands: Option<Vec<String>>,
    pub proximity: Option<Proximity>,
}

/// Human-readable echo of what the parser understood. Display only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEcho {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub count: String,
    #[serde(default)]
    pub sort: String,
}

impl std::fmt::Display for DisplayEcho {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "位置: {location} · ")?;
        }
        write!(
            f,
            "类型: {} · 范围: {} · 数量: {} · 排序: {}",
            self.kind, self.range, self.count, self.sort
        )
    }
}

/// Structured form of a free-text request.
///
/// `radius` is in meters; both `radius` and `limit` are strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryIntent {
    pub category: String,
    pub subcategory: Option<String>,
    pub radius: u32,
    pub limit: u32,
    pub sort_by: SortBy,
    pub filters: Filters,
    pub display: DisplayEcho,
}

impl QueryIntent {
    /// Location the search should be centred on.
    ///
    /// A place extracted by the parser always wins over the caller's
    /// reference location.
    #[must_use]
    pub fn search_location(&self, reference: GeoPoint) -> GeoPoint {
        self.filters.location.unwrap_or(reference)
    }
}

// ---------------------------------------------------------------------------
// SearchResult
// ---------------------------------------------------------------------------

/// Nearest transit station to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitInfo {
    pub name: String,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub exit: Option<String>,
    /// Meters from the result to the station.
    pub distance: f64,
}

/// One ranked place. Position within a result set is its rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, deserialize_with = "text_or_list")]
    pub address: String,
    pub location: GeoPoint,
    /// Meters from the search location.
    pub distance: f64,
    #[serde(default, deserialize_with = "optional_text_or_list")]
    pub phone: Option<String>,
    #[serde(default, rename = "nearest_subway", alias = "nearest_transit")]
    pub nearest_transit: Option<TransitInfo>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Some upstream POI providers emit `[]` instead of `""` for empty text.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    fn into_text(self) -> Option<String> {
        let joined = match self {
            TextOrList::Text(s) => s,
            TextOrList::List(items) => items.join(";"),
        };
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }
}

fn optional_text_or_list<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<TextOrList>::deserialize(deserializer)?;
    Ok(raw.and_then(TextOrList::into_text))
}

fn text_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text_or_list(deserializer)?.unwrap_or_default())
}
