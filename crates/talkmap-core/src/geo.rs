//! Coordinate value types and distance formatting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a coordinate falls outside the WGS-84 ranges.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A validated latitude/longitude pair.
///
/// Construction goes through [`GeoPoint::new`], and deserialization routes
/// through the same check, so a `GeoPoint` in hand is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Builds a point, rejecting NaN and out-of-range components.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::LatitudeOutOfRange`] or
    /// [`GeoError::LongitudeOutOfRange`] when a component is not within the
    /// WGS-84 bounds.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(self) -> f64 {
        self.lng
    }

    /// `"lng,lat"`, the ordering map SDKs and URI schemes expect.
    #[must_use]
    pub fn lng_lat(self) -> String {
        format!("{},{}", self.lng, self.lat)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl Bounds {
    /// Smallest box covering every point, or `None` for an empty input.
    ///
    /// Does not handle boxes that straddle the antimeridian.
    pub fn covering<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut south, mut west, mut north, mut east) =
            (first.lat, first.lng, first.lat, first.lng);
        for p in iter {
            south = south.min(p.lat);
            north = north.max(p.lat);
            west = west.min(p.lng);
            east = east.max(p.lng);
        }
        Some(Self {
            south_west: GeoPoint {
                lat: south,
                lng: west,
            },
            north_east: GeoPoint {
                lat: north,
                lng: east,
            },
        })
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: f64::midpoint(self.south_west.lat, self.north_east.lat),
            lng: f64::midpoint(self.south_west.lng, self.north_east.lng),
        }
    }

    #[must_use]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }

    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.north_east.lng - self.south_west.lng
    }
}

/// Formats a distance in meters for display.
///
/// Below one kilometre the value is rounded to whole meters (`"950米"`);
/// from one kilometre up it is shown in kilometres with one decimal
/// (`"1.5公里"`).
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = meters.round() as i64;
        format!("{whole}米")
    } else {
        format!("{:.1}公里", meters / 1000.0)
    }
}
