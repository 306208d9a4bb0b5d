//! Search session orchestration and the views derived from it.
//!
//! The [`Orchestrator`] owns the one live [`SearchSession`] and publishes a
//! snapshot after every transition. [`present`] and [`MapPresenter`] are both
//! driven from those snapshots and never talk to each other.

pub mod collaborators;
pub mod map;
pub mod navigation;
pub mod orchestrator;
pub mod presentation;

pub use collaborators::{PlaceSearcher, QueryParser};
pub use map::{
    MapId, MapOptions, MapPresenter, MapService, MapSettings, MarkerId, MarkerKind, MarkerSpec,
    Padding, PopupContent, PopupId, Viewport,
};
pub use navigation::{amap_navigation_url, NavigationOpener, NavigationTarget};
pub use orchestrator::{Orchestrator, Phase, SearchSession, SessionToken};
pub use presentation::{present, ResultRow};
