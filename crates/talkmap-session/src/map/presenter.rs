use std::sync::Arc;

use talkmap_core::{format_distance, Bounds, GeoPoint, SearchResult};

use super::{
    MapId, MapOptions, MapService, MapSettings, MarkerId, MarkerKind, MarkerSpec, PopupContent,
    PopupId, Viewport,
};
use crate::orchestrator::SearchSession;

const REFERENCE_TITLE: &str = "您的位置";

#[derive(Debug, Clone, Copy)]
struct AttachedMarker {
    id: MarkerId,
    kind: MarkerKind,
}

/// Keeps one map and its markers consistent with `(reference, results)`.
///
/// The map is created on the first update and never recreated. Every rebuild
/// closes the open popup and removes every marker it attached before adding
/// the new set, so nothing accumulates across searches.
pub struct MapPresenter<M> {
    service: M,
    settings: MapSettings,
    map: Option<MapId>,
    markers: Vec<AttachedMarker>,
    popup: Option<PopupId>,
    shown: Option<(GeoPoint, Arc<[SearchResult]>)>,
}

impl<M: MapService> MapPresenter<M> {
    pub fn new(service: M, settings: MapSettings) -> Self {
        Self {
            service,
            settings,
            map: None,
            markers: Vec::new(),
            popup: None,
            shown: None,
        }
    }

    pub fn service(&self) -> &M {
        &self.service
    }

    #[must_use]
    pub fn map_id(&self) -> Option<MapId> {
        self.map
    }

    /// Markers currently attached, reference marker first.
    pub fn markers(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.markers.iter().map(|m| m.id)
    }

    #[must_use]
    pub fn open_popup(&self) -> Option<PopupId> {
        self.popup
    }

    /// `None` until the map exists.
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.map.map(|map| self.service.viewport(map))
    }

    /// Rebuilds if `session` shows a different reference or result set than
    /// the last update. Returns whether a rebuild happened.
    pub fn sync(&mut self, session: &SearchSession) -> bool {
        let unchanged = self.shown.as_ref().is_some_and(|(reference, results)| {
            *reference == session.reference && Arc::ptr_eq(results, &session.results)
        });
        if unchanged {
            return false;
        }
        self.update(session.reference, Arc::clone(&session.results));
        true
    }

    /// Unconditionally rebuilds the overlay for `reference` and `results`.
    ///
    /// The viewport is fitted to the reference plus every result. With no
    /// results the viewport is left where it is.
    pub fn update(&mut self, reference: GeoPoint, results: Arc<[SearchResult]>) {
        let map = self.ensure_map(reference);
        self.clear(map);

        let spec = MarkerSpec {
            position: reference,
            kind: MarkerKind::Reference,
            title: REFERENCE_TITLE.to_owned(),
        };
        let id = self.service.add_marker(map, &spec);
        self.markers.push(AttachedMarker {
            id,
            kind: spec.kind,
        });

        for (i, result) in results.iter().enumerate() {
            let spec = MarkerSpec {
                position: result.location,
                kind: MarkerKind::Result { rank: i + 1 },
                title: result.name.clone(),
            };
            let id = self.service.add_marker(map, &spec);
            self.markers.push(AttachedMarker {
                id,
                kind: spec.kind,
            });
        }

        if !results.is_empty() {
            let points = std::iter::once(reference).chain(results.iter().map(|r| r.location));
            if let Some(bounds) = Bounds::covering(points) {
                self.service.fit_bounds(map, &bounds, self.settings.padding);
            }
        }

        tracing::debug!(
            markers = self.markers.len(),
            results = results.len(),
            "map overlay rebuilt"
        );
        self.shown = Some((reference, results));
    }

    /// Opens the detail popup for `marker`, closing any other.
    ///
    /// Returns `None` for a marker this presenter did not attach.
    pub fn open_marker(&mut self, marker: MarkerId) -> Option<PopupId> {
        let kind = self.markers.iter().find(|m| m.id == marker)?.kind;
        self.open(kind)
    }

    /// Opens the popup for the result with 1-based `rank`.
    pub fn open_rank(&mut self, rank: usize) -> Option<PopupId> {
        let kind = MarkerKind::Result { rank };
        if !self.markers.iter().any(|m| m.kind == kind) {
            return None;
        }
        self.open(kind)
    }

    fn open(&mut self, kind: MarkerKind) -> Option<PopupId> {
        let map = self.map?;
        let (reference, results) = self.shown.as_ref()?;
        let (at, content) = match kind {
            MarkerKind::Reference => (
                *reference,
                PopupContent {
                    title: REFERENCE_TITLE.to_owned(),
                    address: reference.to_string(),
                    distance: None,
                    phone: None,
                },
            ),
            MarkerKind::Result { rank } => {
                let result = results.get(rank.checked_sub(1)?)?;
                (result.location, popup_content(result))
            }
        };

        if let Some(previous) = self.popup.take() {
            self.service.close_popup(map, previous);
        }
        let popup = self.service.open_popup(map, at, &content);
        self.popup = Some(popup);
        Some(popup)
    }

    fn ensure_map(&mut self, reference: GeoPoint) -> MapId {
        if let Some(map) = self.map {
            return map;
        }
        let map = self.service.create_map(&MapOptions {
            center: reference,
            zoom: self.settings.zoom,
            style: self.settings.style.clone(),
        });
        tracing::info!(center = %reference, zoom = self.settings.zoom, "map created");
        self.map = Some(map);
        map
    }

    fn clear(&mut self, map: MapId) {
        if let Some(popup) = self.popup.take() {
            self.service.close_popup(map, popup);
        }
        for marker in self.markers.drain(..) {
            self.service.remove_marker(map, marker.id);
        }
    }
}

fn popup_content(result: &SearchResult) -> PopupContent {
    PopupContent {
        title: result.name.clone(),
        address: result.address.clone(),
        distance: Some(format_distance(result.distance)),
        phone: result.phone.clone(),
    }
}

#[cfg(test)]
#[path = "presenter_test.rs"]
mod tests;
