//! Wire types for the parsing, search, and route collaborators.
//!
//! Every response is wrapped in a `{"success": bool, "message": ..., "data": ...}`
//! envelope. The payload stays raw JSON until `success` has been checked, so
//! a rejection is reported as such whatever its `data` holds. Payload fields
//! are optional so that a missing field can be reported by name instead of as
//! a generic decode failure; validated domain types live in `talkmap-core`.

use serde::{Deserialize, Serialize};
use talkmap_core::{GeoPoint, SearchResult};

/// Common `{success, message, data}` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// POST /api/parse-query
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ParseRequest<'a> {
    pub message: &'a str,
    pub location: GeoPoint,
}

/// Parse response: the envelope plus a sibling `display` block.
#[derive(Debug, Deserialize)]
pub struct ParseResponse {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(default)]
    pub display: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawIntent {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub radius: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub filters: Option<RawFilters>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawFilters {
    pub location: Option<GeoPoint>,
    pub brands: Option<Vec<String>>,
    pub proximity: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /api/search
// ---------------------------------------------------------------------------

/// Structured search request. `location` is already resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest<'a> {
    pub category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<&'a str>,
    pub radius: u32,
    pub limit: u32,
    pub sort_by: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brands: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximity: Option<&'a str>,
    pub location: GeoPoint,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

// ---------------------------------------------------------------------------
// POST /api/route
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walking,
    Driving,
    Transit,
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelMode::Walking => write!(f, "walking"),
            TravelMode::Driving => write!(f, "driving"),
            TravelMode::Transit => write!(f, "transit"),
        }
    }
}

impl std::str::FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walking" => Ok(TravelMode::Walking),
            "driving" => Ok(TravelMode::Driving),
            "transit" => Ok(TravelMode::Transit),
            other => Err(format!(
                "unknown travel mode '{other}' (expected walking, driving or transit)"
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub mode: TravelMode,
}

/// A planned route. Distances in meters, durations in minutes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoutePlan {
    pub distance: f64,
    pub duration: f64,
    pub mode: String,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance: f64,
    pub duration: f64,
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
