//! Response header curation

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Upstream response headers copied to the client when present
pub const PASSTHROUGH_HEADERS: [HeaderName; 6] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::ETAG,
    header::LAST_MODIFIED,
];

/// Manuals are addressed by path and never rewritten in place.
pub const CACHE_CONTROL_POLICY: &str = "public, max-age=31536000, immutable";

pub const EXPOSED_HEADERS: &str = "Content-Range, ETag, Content-Length, Accept-Ranges";

pub const VARY_POLICY: &str = "Range, Accept-Encoding";

/// Allow-listed upstream headers plus CORS, `Vary` and `Cache-Control`.
///
/// Shared by full, partial and not-modified responses.
pub fn curated_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for name in PASSTHROUGH_HEADERS.iter() {
        if let Some(value) = upstream.get(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );
    headers.insert(header::VARY, HeaderValue::from_static(VARY_POLICY));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_CONTROL_POLICY),
    );

    headers
}

/// `Content-Disposition` for `filename`.
///
/// Names that are not plain visible ASCII get an ASCII fallback plus an
/// RFC 5987 `filename*` parameter.
pub fn content_disposition(filename: &str, download: bool) -> HeaderValue {
    let kind = if download { "attachment" } else { "inline" };

    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let value = if fallback == filename {
        format!("{kind}; filename=\"{fallback}\"")
    } else {
        format!(
            "{kind}; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    };

    // Only visible ASCII remains at this point
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("inline"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_headers_copy_allow_list_only() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
        upstream.insert(header::ETAG, HeaderValue::from_static("\"v1\""));
        upstream.insert(header::SET_COOKIE, HeaderValue::from_static("bucket=1"));
        upstream.insert(
            HeaderName::from_static("x-amz-request-id"),
            HeaderValue::from_static("abc"),
        );

        let headers = curated_headers(&upstream);

        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(headers[header::ETAG], "\"v1\"");
        assert!(headers.get(header::SET_COOKIE).is_none());
        assert!(headers.get("x-amz-request-id").is_none());
        assert!(headers.get(header::CONTENT_RANGE).is_none());
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_EXPOSE_HEADERS], EXPOSED_HEADERS);
        assert_eq!(headers[header::VARY], VARY_POLICY);
        assert_eq!(headers[header::CACHE_CONTROL], CACHE_CONTROL_POLICY);
    }

    #[test]
    fn test_content_disposition_kinds() {
        assert_eq!(
            content_disposition("honda-activa-e.pdf", false),
            "inline; filename=\"honda-activa-e.pdf\""
        );
        assert_eq!(
            content_disposition("honda-activa-e.pdf", true),
            "attachment; filename=\"honda-activa-e.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_escapes_awkward_names() {
        assert_eq!(
            content_disposition("say \"hi\".pdf", false),
            "inline; filename=\"say _hi_.pdf\"; filename*=UTF-8''say%20%22hi%22.pdf"
        );
        assert_eq!(
            content_disposition("shine-100-हिंदी.pdf", true).to_str().unwrap().split("; ").next(),
            Some("attachment")
        );
        assert!(content_disposition("shine-100-हिंदी.pdf", true)
            .to_str()
            .unwrap()
            .contains("filename*=UTF-8''shine-100-"));
    }
}
