//! HTTP clients for the talkmap collaborators.
//!
//! [`ParseClient`] turns free text into a [`talkmap_core::QueryIntent`],
//! [`SearchClient`] runs the structured search, and [`RouteClient`] asks for
//! a route between two points. All three share one [`ApiClient`] and report
//! failures as classified [`talkmap_core::ErrorInfo`] values.

pub mod client;
pub mod error;
pub mod parse;
pub mod route;
pub mod search;
pub mod types;

pub use client::ApiClient;
pub use error::{ClientError, Endpoint};
pub use parse::{validate_query, ParseClient, MAX_QUERY_CHARS};
pub use route::RouteClient;
pub use search::{build_search_request, SearchClient};
pub use types::{RoutePlan, RouteStep, SearchRequest, TravelMode};
