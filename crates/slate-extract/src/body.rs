//! Request body checks.

use crate::{ExtractionContext, ExtractionError};

/// Default maximum body size (1 MB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Returns true if `content_type` names a JSON media type.
///
/// Accepts `application/json` and structured `+json` suffixes, ignoring
/// parameters such as `charset`.
pub fn is_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
        _ => false,
    }
}

/// Returns the body bytes if there are any, after size and media type checks.
///
/// An empty body yields `Ok(None)` regardless of headers. A body without a
/// `Content-Type` is assumed to be JSON.
pub fn json_body(
    ctx: &ExtractionContext,
    max_bytes: usize,
) -> Result<Option<&[u8]>, ExtractionError> {
    let body = ctx.body();
    if body.is_empty() {
        return Ok(None);
    }
    if body.len() > max_bytes {
        return Err(ExtractionError::payload_too_large(max_bytes, body.len()));
    }
    match ctx.content_type() {
        Some(content_type) if !is_json(content_type) => {
            Err(ExtractionError::unsupported_media_type(content_type))
        }
        _ => Ok(Some(body.as_ref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractionContextBuilder;
    use http::header::CONTENT_TYPE;
    use http::StatusCode;

    #[test]
    fn test_is_json() {
        assert!(is_json("application/json"));
        assert!(is_json("Application/JSON; charset=utf-8"));
        assert!(is_json("application/problem+json"));
        assert!(!is_json("text/plain"));
        assert!(!is_json("application/x-www-form-urlencoded"));
        assert!(!is_json(""));
    }

    #[test]
    fn test_empty_body_is_none() {
        let ctx = ExtractionContextBuilder::new()
            .header(CONTENT_TYPE, "text/plain")
            .build()
            .unwrap();
        assert_eq!(json_body(&ctx, 10).unwrap(), None);
    }

    #[test]
    fn test_size_limit() {
        let ctx = ExtractionContextBuilder::new().body("[1,2,3,4,5]").build().unwrap();
        let err = json_body(&ctx, 4).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(&ctx, 64).unwrap(), Some(&b"[1,2,3,4,5]"[..]));
    }

    #[test]
    fn test_rejects_non_json() {
        let ctx = ExtractionContextBuilder::new()
            .header(CONTENT_TYPE, "text/plain")
            .body("hello")
            .build()
            .unwrap();
        let err = json_body(&ctx, DEFAULT_MAX_BODY_BYTES).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
