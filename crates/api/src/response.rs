//! Shared response types for API handlers.

use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use roster_core::pagination::PagedList;
use serde::Serialize;

/// Response header carrying pagination metadata as JSON.
pub const PAGINATION_HEADER: HeaderName = HeaderName::from_static("x-pagination");

/// A page of items serialized as a JSON array body, with its
/// [`PaginationMetadata`](roster_core::pagination::PaginationMetadata) in the
/// `X-Pagination` header.
#[derive(Debug)]
pub struct Paginated<T>(pub PagedList<T>);

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        let PagedList { items, metadata } = self.0;
        let mut response = Json(items).into_response();

        match serde_json::to_string(&metadata)
            .ok()
            .and_then(|raw| HeaderValue::from_str(&raw).ok())
        {
            Some(value) => {
                response.headers_mut().insert(PAGINATION_HEADER, value);
            }
            None => tracing::error!(?metadata, "Failed to encode pagination header"),
        }
        response
    }
}
