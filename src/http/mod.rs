//! Helpers for receiving GraphQL multipart requests over HTTP.

mod file_map;
mod handler;
mod multipart;

use std::future::Future;

use ::http::header::CONTENT_TYPE;
use ::http::HeaderMap;

pub use file_map::FileMap;
pub use handler::MultipartHandler;
pub use multipart::{receive_multipart, MultipartForm, MultipartOptions, DEFAULT_MAX_MEMORY};

/// An HTTP request handler.
///
/// Implemented by [`MultipartHandler`](struct.MultipartHandler.html) and by every async function
/// taking an `http::Request<B>`, so handlers can be used as the fallback of another handler.
#[async_trait::async_trait]
pub trait Endpoint<B: Send + 'static>: Send + Sync + 'static {
    /// Handle the request.
    async fn call(&self, req: ::http::Request<B>) -> ::http::Response<Vec<u8>>;
}

#[async_trait::async_trait]
impl<B, F, Fut> Endpoint<B> for F
where
    B: Send + 'static,
    F: Fn(::http::Request<B>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ::http::Response<Vec<u8>>> + Send + 'static,
{
    async fn call(&self, req: ::http::Request<B>) -> ::http::Response<Vec<u8>> {
        (self)(req).await
    }
}

/// Returns true if the `Content-Type` of the headers is `multipart/form-data`, parameters such as
/// the boundary are ignored.
pub fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|content_type| content_type.split(';').next())
        .map_or(false, |essence| {
            essence.trim().eq_ignore_ascii_case("multipart/form-data")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::http::HeaderValue;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        headers
    }

    #[test]
    fn test_is_multipart() {
        assert!(is_multipart(&headers(Some("multipart/form-data"))));
        assert!(is_multipart(&headers(Some(
            "multipart/form-data; boundary=abc"
        ))));
        assert!(is_multipart(&headers(Some("Multipart/Form-Data;boundary=abc"))));
        assert!(!is_multipart(&headers(Some("application/json"))));
        assert!(!is_multipart(&headers(Some("multipart/mixed; boundary=abc"))));
        assert!(!is_multipart(&headers(Some("text/plain; multipart/form-data"))));
        assert!(!is_multipart(&headers(None)));
    }
}
