//! PDF proxy route
//!
//! `GET /proxy/{...path}?download={0|1}` streams a manual from the object store.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::Response,
    routing::get,
    Router,
};

use crate::document::DocumentRef;
use crate::error::{AppError, Result, UpstreamError};
use crate::proxy::{content_disposition, curated_headers, DownloadQuery, ProxyRequest};
use crate::state::AppState;

/// Create the proxy router
pub fn router() -> Router<AppState> {
    Router::new().route("/*path", get(proxy_document))
}

/// Forward one document request upstream and stream the answer back
async fn proxy_document(
    State(state): State<AppState>,
    uri: Uri,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response> {
    // Inside the nested router the URI is relative to `/proxy` and still
    // percent-encoded, which is what the upstream URL needs.
    let document = DocumentRef::parse(uri.path())?;
    let request = ProxyRequest::from_parts(&headers, &DownloadQuery::from_pairs(&pairs));

    let upstream = state.upstream().fetch(&document, &request).await?;
    let status = upstream.status();

    if !status.is_success() && status != StatusCode::NOT_MODIFIED {
        return Err(UpstreamError::Status(status).into());
    }

    let mut response_headers = curated_headers(upstream.headers());

    if status == StatusCode::NOT_MODIFIED {
        tracing::debug!(document = %document, "Upstream copy not modified");
        return build(status, response_headers, Body::empty());
    }

    response_headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&document.file_name(), request.download),
    );

    tracing::debug!(
        document = %document,
        %status,
        download = request.download,
        "Streaming document"
    );

    build(
        status,
        response_headers,
        Body::from_stream(upstream.bytes_stream()),
    )
}

fn build(status: StatusCode, headers: HeaderMap, body: Body) -> Result<Response> {
    let mut builder = Response::builder().status(status);
    if let Some(target) = builder.headers_mut() {
        target.extend(headers);
    }
    builder
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}
