//! Map rendering seam and the presenter that keeps it in sync with a session.
//!
//! A [`MapService`] owns the actual map, markers and popups and hands out
//! opaque handles for them. [`MapPresenter`] is the only thing that calls it.

mod presenter;

pub use presenter::MapPresenter;

use talkmap_core::{AppConfig, Bounds, GeoPoint};

/// Handle to a map instance created by a [`MapService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(u64);

/// Handle to a marker attached to a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(u64);

/// Handle to an open info popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupId(u64);

macro_rules! handle {
    ($name:ident) => {
        impl $name {
            /// Wraps a backend-assigned identifier.
            #[must_use]
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            #[must_use]
            pub fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

handle!(MapId);
handle!(MarkerId);
handle!(PopupId);

/// Map creation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: GeoPoint,
    pub zoom: u8,
    pub style: String,
}

/// Padding in pixels kept between fitted points and the map edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Padding {
    #[must_use]
    pub fn uniform(px: u32) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

/// Presenter-level map settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Zoom used when the map is first created.
    pub zoom: u8,
    pub style: String,
    pub padding: Padding,
}

impl MapSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            zoom: config.map_zoom,
            style: config.map_style.clone(),
            padding: Padding::uniform(config.fit_padding_px),
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom: 13,
            style: "amap://styles/dark".to_owned(),
            padding: Padding::uniform(50),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The user's (or fallback) position.
    Reference,
    /// A search result; `rank` is 1-based.
    Result { rank: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: GeoPoint,
    pub kind: MarkerKind,
    pub title: String,
}

impl MarkerSpec {
    /// Text drawn on the marker itself: the rank for results, nothing for the
    /// reference marker.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self.kind {
            MarkerKind::Reference => None,
            MarkerKind::Result { rank } => Some(rank.to_string()),
        }
    }
}

/// Body of a marker's detail popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub title: String,
    pub address: String,
    pub distance: Option<String>,
    pub phone: Option<String>,
}

/// Current center and zoom of a map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
}

/// Map-rendering backend.
///
/// Handles returned by one call are only meaningful to the same service.
/// Removing or closing an unknown handle is a no-op.
pub trait MapService {
    fn create_map(&mut self, options: &MapOptions) -> MapId;

    fn add_marker(&mut self, map: MapId, marker: &MarkerSpec) -> MarkerId;

    fn remove_marker(&mut self, map: MapId, marker: MarkerId);

    fn open_popup(&mut self, map: MapId, at: GeoPoint, content: &PopupContent) -> PopupId;

    fn close_popup(&mut self, map: MapId, popup: PopupId);

    /// Moves the viewport so `bounds` is fully visible inside `padding`.
    fn fit_bounds(&mut self, map: MapId, bounds: &Bounds, padding: Padding);

    fn viewport(&self, map: MapId) -> Viewport;
}
