//! Query parsing endpoint: free text plus a reference point in, a validated
//! [`QueryIntent`] out.

use talkmap_core::{DisplayEcho, ErrorInfo, Filters, GeoPoint, Proximity, QueryIntent, SortBy};

use crate::client::{decode, decode_data, ApiClient};
use crate::error::{ClientError, Endpoint};
use crate::types::{ParseRequest, ParseResponse, RawFilters, RawIntent};

/// Longest query the parsing collaborator accepts, in characters.
pub const MAX_QUERY_CHARS: usize = 500;

const CONTEXT: &str = "parse-query";

/// Client for `POST /api/parse-query`.
#[derive(Debug, Clone)]
pub struct ParseClient {
    api: ApiClient,
}

impl ParseClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Parses `text` relative to `reference`.
    ///
    /// Empty (after trimming) or over-long text is rejected without any
    /// network call. No retries are attempted.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorInfo`] classified as `Validation`, `Network`,
    /// `Protocol`, or `ParseFailed`.
    pub async fn parse(&self, text: &str, reference: GeoPoint) -> Result<QueryIntent, ErrorInfo> {
        self.try_parse(text, reference)
            .await
            .map_err(|e| e.classify(Endpoint::Parse))
    }

    async fn try_parse(&self, text: &str, reference: GeoPoint) -> Result<QueryIntent, ClientError> {
        let message = validate_query(text)?;
        let request = ParseRequest {
            message,
            location: reference,
        };
        let body = self.api.post_json("api/parse-query", &request).await?;
        let response: ParseResponse = decode(body, CONTEXT)?;

        if !response.envelope.success {
            tracing::warn!(
                query = message,
                reason = ?response.envelope.message,
                "parser rejected query"
            );
            return Err(ClientError::Rejected {
                message: response.envelope.message,
            });
        }

        let intent = intent_from_wire(response)?;
        tracing::debug!(
            category = %intent.category,
            radius = intent.radius,
            limit = intent.limit,
            sort_by = %intent.sort_by,
            explicit_location = intent.filters.location.is_some(),
            "query parsed"
        );
        Ok(intent)
    }
}

/// Trims `text` and enforces the non-empty and length constraints.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for blank or over-long input.
pub fn validate_query(text: &str) -> Result<&str, ClientError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation("请输入查询内容".to_owned()));
    }
    if trimmed.chars().count() > MAX_QUERY_CHARS {
        return Err(ClientError::Validation(format!(
            "查询内容过长（最多{MAX_QUERY_CHARS}字）"
        )));
    }
    Ok(trimmed)
}

/// Validates a successful parse response and builds the domain intent.
pub(crate) fn intent_from_wire(response: ParseResponse) -> Result<QueryIntent, ClientError> {
    let RawIntent {
        category,
        subcategory,
        radius,
        limit,
        sort_by,
        filters,
    } = decode_data(response.envelope.data, CONTEXT)?;
    let display: Option<DisplayEcho> = response
        .display
        .map(|value| decode(value, CONTEXT))
        .transpose()?;

    let category = non_blank(category).ok_or(ClientError::MissingField {
        context: CONTEXT,
        field: "category",
    })?;
    let radius = positive(radius, "radius")?;
    let limit = positive(limit, "limit")?;
    let sort_by = non_blank(sort_by).ok_or(ClientError::MissingField {
        context: CONTEXT,
        field: "sort_by",
    })?;

    let RawFilters {
        location,
        brands,
        proximity,
    } = filters.unwrap_or_default();

    let brands = brands
        .map(|list| {
            list.into_iter()
                .filter_map(|b| non_blank(Some(b)))
                .collect::<Vec<_>>()
        })
        .filter(|list| !list.is_empty());

    Ok(QueryIntent {
        category,
        subcategory: non_blank(subcategory),
        radius,
        limit,
        sort_by: SortBy::new(sort_by),
        filters: Filters {
            location,
            brands,
            proximity: non_blank(proximity).map(Proximity::new),
        },
        display: display.unwrap_or_default(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn positive(value: Option<i64>, field: &'static str) -> Result<u32, ClientError> {
    let raw = value.ok_or(ClientError::MissingField {
        context: CONTEXT,
        field,
    })?;
    match u32::try_from(raw) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(ClientError::InvalidField {
            context: CONTEXT,
            field,
            reason: format!("expected a positive integer, got {raw}"),
        }),
    }
}
