//! Structured search endpoint.

use talkmap_core::{ErrorInfo, GeoPoint, QueryIntent, SearchResult};

use crate::client::{decode, decode_data, ApiClient};
use crate::error::{ClientError, Endpoint};
use crate::types::{Envelope, SearchData, SearchRequest};

const CONTEXT: &str = "search";

/// Client for `POST /api/search`.
#[derive(Debug, Clone)]
pub struct SearchClient {
    api: ApiClient,
}

impl SearchClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Runs the search described by `intent`.
    ///
    /// The search is centred on the intent's explicit location when the parser
    /// found one, otherwise on `reference`. Results come back in the order the
    /// ranking collaborator chose; this client never reorders or filters them.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorInfo`] classified as `Network`, `Protocol`, or
    /// `SearchFailed`.
    pub async fn search(
        &self,
        intent: &QueryIntent,
        reference: GeoPoint,
    ) -> Result<Vec<SearchResult>, ErrorInfo> {
        self.try_search(intent, reference)
            .await
            .map_err(|e| e.classify(Endpoint::Search))
    }

    async fn try_search(
        &self,
        intent: &QueryIntent,
        reference: GeoPoint,
    ) -> Result<Vec<SearchResult>, ClientError> {
        let request = build_search_request(intent, reference);
        tracing::debug!(
            category = request.category,
            location = %request.location,
            radius = request.radius,
            "searching"
        );
        let body = self.api.post_json("api/search", &request).await?;
        let envelope: Envelope = decode(body, CONTEXT)?;

        if !envelope.success {
            tracing::warn!(reason = ?envelope.message, "search collaborator rejected request");
            return Err(ClientError::Rejected {
                message: envelope.message,
            });
        }

        let data: SearchData = decode_data(envelope.data, CONTEXT)?;
        validate_results(&data.results)?;
        tracing::debug!(
            count = data.results.len(),
            total = ?data.total,
            "search returned results"
        );
        Ok(data.results)
    }
}

/// Builds the wire request, resolving the effective search location.
///
/// A location extracted by the parser always supersedes `reference`.
#[must_use]
pub fn build_search_request(intent: &QueryIntent, reference: GeoPoint) -> SearchRequest<'_> {
    SearchRequest {
        category: &intent.category,
        subcategory: intent.subcategory.as_deref(),
        radius: intent.radius,
        limit: intent.limit,
        sort_by: intent.sort_by.as_str(),
        brands: intent.filters.brands.as_deref(),
        proximity: intent.filters.proximity.as_ref().map(|p| p.as_str()),
        location: intent.search_location(reference),
    }
}

fn validate_results(results: &[SearchResult]) -> Result<(), ClientError> {
    for result in results {
        if !result.distance.is_finite() || result.distance < 0.0 {
            return Err(ClientError::InvalidField {
                context: CONTEXT,
                field: "distance",
                reason: format!("result '{}' has distance {}", result.id, result.distance),
            });
        }
        if let Some(transit) = &result.nearest_transit {
            if !transit.distance.is_finite() || transit.distance < 0.0 {
                return Err(ClientError::InvalidField {
                    context: CONTEXT,
                    field: "nearest_subway.distance",
                    reason: format!("result '{}' has distance {}", result.id, transit.distance),
                });
            }
        }
    }
    Ok(())
}
