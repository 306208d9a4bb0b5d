//! Shared domain types for talkmap.
//!
//! Coordinates, parsed query intents, ranked search results, the error shape
//! surfaced to the UI, and environment-driven configuration.

pub mod app_config;
pub mod config;
pub mod error;
pub mod geo;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ErrorInfo, ErrorKind};
pub use geo::{format_distance, Bounds, GeoError, GeoPoint};
pub use types::{
    DisplayEcho, Filters, Proximity, ProximityKind, QueryIntent, SearchResult, SortBy, SortKey,
    TransitInfo, SAMPLE_QUERIES,
};
