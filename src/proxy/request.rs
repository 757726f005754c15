//! Per-request proxy context

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Request headers forwarded to the object store, in forwarding order
pub const FORWARDED_HEADERS: [HeaderName; 3] = [
    header::RANGE,
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
];

/// Download intent from the proxy route's query string.
///
/// Read from raw key/value pairs so repeated keys never reject the request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadQuery {
    download: bool,
}

impl DownloadQuery {
    /// Any `download=1` pair asks for an attachment; other values are inline.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            download: pairs
                .iter()
                .any(|(key, value)| key.as_ref() == "download" && value.as_ref() == "1"),
        }
    }

    pub fn is_download(&self) -> bool {
        self.download
    }
}

/// Conditional/range headers plus download intent for one inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRequest {
    pub range: Option<HeaderValue>,
    pub if_none_match: Option<HeaderValue>,
    pub if_modified_since: Option<HeaderValue>,
    pub download: bool,
}

impl ProxyRequest {
    pub fn from_parts(headers: &HeaderMap, query: &DownloadQuery) -> Self {
        Self {
            range: headers.get(header::RANGE).cloned(),
            if_none_match: headers.get(header::IF_NONE_MATCH).cloned(),
            if_modified_since: headers.get(header::IF_MODIFIED_SINCE).cloned(),
            download: query.is_download(),
        }
    }

    /// Headers to send upstream; everything else from the client is dropped.
    pub fn upstream_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let values = [&self.range, &self.if_none_match, &self.if_modified_since];

        for (name, value) in FORWARDED_HEADERS.iter().zip(values) {
            if let Some(value) = value {
                if !value.is_empty() {
                    headers.insert(name.clone(), value.clone());
                }
            }
        }

        headers
    }

    pub fn is_conditional(&self) -> bool {
        self.if_none_match.is_some() || self.if_modified_since.is_some()
    }
}
