//! Route planning endpoint. Used by the CLI, not by the search flow.

use talkmap_core::{ErrorInfo, GeoPoint};

use crate::client::{decode, decode_data, ApiClient};
use crate::error::{ClientError, Endpoint};
use crate::types::{Envelope, RoutePlan, RouteRequest, TravelMode};

const CONTEXT: &str = "route";

/// Client for `POST /api/route`.
#[derive(Debug, Clone)]
pub struct RouteClient {
    api: ApiClient,
}

impl RouteClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Plans a route from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorInfo`] classified as `Network`, `Protocol`, or
    /// `RouteFailed`.
    pub async fn plan(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<RoutePlan, ErrorInfo> {
        self.try_plan(origin, destination, mode)
            .await
            .map_err(|e| e.classify(Endpoint::Route))
    }

    async fn try_plan(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<RoutePlan, ClientError> {
        let request = RouteRequest {
            origin,
            destination,
            mode,
        };
        let body = self.api.post_json("api/route", &request).await?;
        let envelope: Envelope = decode(body, CONTEXT)?;

        if !envelope.success {
            tracing::warn!(reason = ?envelope.message, %mode, "route planner rejected request");
            return Err(ClientError::Rejected {
                message: envelope.message,
            });
        }

        let plan: RoutePlan = decode_data(envelope.data, CONTEXT)?;
        tracing::debug!(
            distance = plan.distance,
            duration_min = plan.duration,
            steps = plan.steps.len(),
            "route planned"
        );
        Ok(plan)
    }
}
