//! PDF proxy
//!
//! Mediates between browsers and the object store:
//! - forwards only the validation/range headers (`Range`, `If-None-Match`,
//!   `If-Modified-Since`)
//! - copies an allow-list of upstream response headers
//! - adds CORS, `Vary`, long-lived caching and `Content-Disposition`
//! - streams the body through without buffering

mod headers;
mod request;
mod upstream;

pub use headers::{
    content_disposition, curated_headers, CACHE_CONTROL_POLICY, EXPOSED_HEADERS,
    PASSTHROUGH_HEADERS, VARY_POLICY,
};
pub use request::{DownloadQuery, ProxyRequest};
pub use upstream::UpstreamClient;
