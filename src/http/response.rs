//! HTTP response building module
//!
//! Provides builders for the status code responses the router and handlers emit.

use super::{empty, full, ResponseBody};
use crate::logger;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

pub const POLICY_VIOLATION_ERROR: &str = "Request blocked: security policy violation";
pub const POLICY_VIOLATION_DETAILS: &str =
    "The request was flagged for potential PII or unsafe content.";
pub const GENERIC_FAILURE_ERROR: &str = "Failed to process chat request";

/// Body of a 403 policy-violation response
#[derive(Debug, Serialize)]
pub struct PolicyViolationBody<'a> {
    pub error: &'a str,
    pub details: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<&'a str>,
}

/// Body of a 500 response
#[derive(Debug, Serialize)]
pub struct GenericFailureBody<'a> {
    pub error: &'a str,
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<ResponseBody> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .body(full(r#"{"error":"Internal server error"}"#))
                .unwrap_or_else(|_| Response::new(full("Error")));
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(full(json))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full("Error"))
        })
}

/// Build 403 policy violation response, optionally echoing the upstream action
pub fn build_policy_violation_response(action_taken: Option<&str>) -> Response<ResponseBody> {
    json_response(
        StatusCode::FORBIDDEN,
        &PolicyViolationBody {
            error: POLICY_VIOLATION_ERROR,
            details: POLICY_VIOLATION_DETAILS,
            action_taken,
        },
    )
}

/// Build 500 response with the fixed generic message
pub fn build_generic_failure_response() -> Response<ResponseBody> {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &GenericFailureBody {
            error: GENERIC_FAILURE_ERROR,
        },
    )
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(304)
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(empty())
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain")
        .body(full("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full("404 Not Found"))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", allow)
        .body(full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full("405 Method Not Allowed"))
        })
}

/// Build OPTIONS response for static assets
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(empty())
        })
}

/// Build generic HTML response
pub fn build_html_response(content: &'static str, is_head: bool) -> Response<ResponseBody> {
    let body = if is_head { empty() } else { full(content) };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content.len())
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty())
        })
}

/// Build success response with cache control
pub fn build_cached_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    is_head: bool,
) -> Response<ResponseBody> {
    let content_length = data.len();
    let body = if is_head { empty() } else { full(data) };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("ETag", etag)
        .header("Cache-Control", "public, max-age=3600")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty())
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response<ResponseBody>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_policy_violation_with_action() {
        let resp = build_policy_violation_response(Some("block"));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(resp.headers()["content-type"], "application/json");
        let json = body_json(resp).await;
        assert_eq!(json["error"], POLICY_VIOLATION_ERROR);
        assert_eq!(json["details"], POLICY_VIOLATION_DETAILS);
        assert_eq!(json["action_taken"], "block");
    }

    #[tokio::test]
    async fn test_policy_violation_without_action_omits_field() {
        let json = body_json(build_policy_violation_response(None)).await;
        assert!(json.get("action_taken").is_none());
    }

    #[tokio::test]
    async fn test_generic_failure_has_only_error() {
        let resp = build_generic_failure_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({ "error": GENERIC_FAILURE_ERROR }));
    }

    #[test]
    fn test_405_allow_header() {
        let resp = build_405_response("POST");
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["allow"], "POST");
    }
}
