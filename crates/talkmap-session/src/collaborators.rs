//! Seams between the orchestrator and the remote collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use talkmap_client::{ParseClient, SearchClient};
use talkmap_core::{ErrorInfo, GeoPoint, QueryIntent, SearchResult};

/// Turns free text into a structured intent.
#[async_trait]
pub trait QueryParser: Send + Sync {
    async fn parse(&self, text: &str, reference: GeoPoint) -> Result<QueryIntent, ErrorInfo>;
}

/// Runs a structured search and returns results in ranked order.
#[async_trait]
pub trait PlaceSearcher: Send + Sync {
    async fn search(
        &self,
        intent: &QueryIntent,
        reference: GeoPoint,
    ) -> Result<Vec<SearchResult>, ErrorInfo>;
}

#[async_trait]
impl QueryParser for ParseClient {
    async fn parse(&self, text: &str, reference: GeoPoint) -> Result<QueryIntent, ErrorInfo> {
        ParseClient::parse(self, text, reference).await
    }
}

#[async_trait]
impl PlaceSearcher for SearchClient {
    async fn search(
        &self,
        intent: &QueryIntent,
        reference: GeoPoint,
    ) -> Result<Vec<SearchResult>, ErrorInfo> {
        SearchClient::search(self, intent, reference).await
    }
}

#[async_trait]
impl<T: QueryParser + ?Sized> QueryParser for Arc<T> {
    async fn parse(&self, text: &str, reference: GeoPoint) -> Result<QueryIntent, ErrorInfo> {
        (**self).parse(text, reference).await
    }
}

#[async_trait]
impl<T: PlaceSearcher + ?Sized> PlaceSearcher for Arc<T> {
    async fn search(
        &self,
        intent: &QueryIntent,
        reference: GeoPoint,
    ) -> Result<Vec<SearchResult>, ErrorInfo> {
        (**self).search(intent, reference).await
    }
}
