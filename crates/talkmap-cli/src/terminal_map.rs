//! In-memory map backend that renders as text.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Write as _;

use talkmap_core::{Bounds, GeoPoint};
use talkmap_session::{
    MapId, MapOptions, MapService, MarkerId, MarkerKind, MarkerSpec, Padding, PopupContent,
    PopupId, Viewport,
};

const TILE_PX: f64 = 256.0;
const MIN_ZOOM: f64 = 3.0;
const MAX_ZOOM: f64 = 18.0;

struct MapState {
    id: MapId,
    style: String,
    center: GeoPoint,
    zoom: f64,
    markers: BTreeMap<u64, MarkerSpec>,
    popup: Option<(u64, PopupContent)>,
}

/// A pretend map of `width` x `height` pixels.
pub(crate) struct TerminalMap {
    width: u32,
    height: u32,
    home: GeoPoint,
    next_id: u64,
    state: Option<MapState>,
}

impl TerminalMap {
    pub(crate) fn new(home: GeoPoint, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            home,
            next_id: 0,
            state: None,
        }
    }

    fn mint(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn state_mut(&mut self, map: MapId) -> Option<&mut MapState> {
        self.state.as_mut().filter(|s| s.id == map)
    }

    pub(crate) fn popup(&self) -> Option<&PopupContent> {
        self.state
            .as_ref()
            .and_then(|s| s.popup.as_ref())
            .map(|(_, content)| content)
    }

    /// One header line plus one line per marker.
    pub(crate) fn render(&self) -> String {
        let Some(state) = &self.state else {
            return String::new();
        };
        let mut out = String::new();
        let _ = writeln!(
            out,
            "地图 {} · 中心 {} · 缩放 {:.0}",
            state.style, state.center, state.zoom
        );
        for marker in state.markers.values() {
            let badge = match marker.kind {
                MarkerKind::Reference => "*".to_owned(),
                MarkerKind::Result { .. } => marker.label().unwrap_or_default(),
            };
            let _ = writeln!(out, "  [{badge:>2}] {} {}", marker.title, marker.position);
        }
        out
    }
}

impl MapService for TerminalMap {
    fn create_map(&mut self, options: &MapOptions) -> MapId {
        let id = MapId::new(self.mint());
        self.state = Some(MapState {
            id,
            style: options.style.clone(),
            center: options.center,
            zoom: f64::from(options.zoom),
            markers: BTreeMap::new(),
            popup: None,
        });
        id
    }

    fn add_marker(&mut self, map: MapId, marker: &MarkerSpec) -> MarkerId {
        let id = self.mint();
        if let Some(state) = self.state_mut(map) {
            state.markers.insert(id, marker.clone());
        }
        MarkerId::new(id)
    }

    fn remove_marker(&mut self, map: MapId, marker: MarkerId) {
        if let Some(state) = self.state_mut(map) {
            state.markers.remove(&marker.raw());
        }
    }

    fn open_popup(&mut self, map: MapId, _at: GeoPoint, content: &PopupContent) -> PopupId {
        let id = self.mint();
        if let Some(state) = self.state_mut(map) {
            state.popup = Some((id, content.clone()));
        }
        PopupId::new(id)
    }

    fn close_popup(&mut self, map: MapId, popup: PopupId) {
        if let Some(state) = self.state_mut(map) {
            if state.popup.as_ref().is_some_and(|(id, _)| *id == popup.raw()) {
                state.popup = None;
            }
        }
    }

    fn fit_bounds(&mut self, map: MapId, bounds: &Bounds, padding: Padding) {
        let zoom = fit_zoom(bounds, padding, self.width, self.height);
        if let Some(state) = self.state_mut(map) {
            state.center = bounds.center();
            state.zoom = zoom;
        }
    }

    fn viewport(&self, map: MapId) -> Viewport {
        match self.state.as_ref().filter(|s| s.id == map) {
            Some(state) => Viewport {
                center: state.center,
                zoom: state.zoom,
            },
            None => Viewport {
                center: self.home,
                zoom: MIN_ZOOM,
            },
        }
    }
}

/// Largest whole web-mercator zoom at which `bounds` fits inside the padded
/// viewport.
fn fit_zoom(bounds: &Bounds, padding: Padding, width: u32, height: u32) -> f64 {
    let usable_w = width.saturating_sub(padding.left.saturating_add(padding.right));
    let usable_h = height.saturating_sub(padding.top.saturating_add(padding.bottom));
    let usable_w = f64::from(usable_w.max(1));
    let usable_h = f64::from(usable_h.max(1));

    // Fractions of the whole world covered horizontally and vertically.
    let x_frac = bounds.lng_span() / 360.0;
    let y_frac =
        (mercator_y(bounds.north_east.lat()) - mercator_y(bounds.south_west.lat())) / (2.0 * PI);

    let zoom_for = |usable: f64, frac: f64| {
        if frac > 0.0 {
            (usable / TILE_PX / frac).log2()
        } else {
            MAX_ZOOM
        }
    };
    zoom_for(usable_w, x_frac)
        .min(zoom_for(usable_h, y_frac))
        .floor()
        .clamp(MIN_ZOOM, MAX_ZOOM)
}

fn mercator_y(lat: f64) -> f64 {
    // Clamp just inside the poles where the projection diverges.
    let sin = lat.to_radians().sin().clamp(-0.9999, 0.9999);
    0.5 * ((1.0 + sin) / (1.0 - sin)).ln()
}
