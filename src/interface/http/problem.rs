use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// RFC 7807 Problem Details payload.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub r#type: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence.
    pub status: u16,
    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// A URI reference that identifies this specific occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// A stable, machine-readable application error code (HOOK_...).
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Build a Problem Details response with the correct content-type.
pub fn problem(
    status: StatusCode,
    code: &str,
    detail: Option<String>,
    instance: Option<String>,
    trace_id: Option<String>,
) -> Response {
    // Step 1: Build the problem payload.
    let payload = ProblemDetails {
        r#type: "about:blank".to_string(),
        title: status.canonical_reason().unwrap_or("Error").to_string(),
        status: status.as_u16(),
        detail,
        instance,
        code: code.to_string(),
        trace_id,
    };

    // Step 2: Convert to an HTTP response with JSON body.
    let mut response = (status, Json(payload)).into_response();

    // Step 3: Ensure RFC 7807 content type.
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/problem+json"),
    );

    response
}

pub const HOOK_REQUEST_MALFORMED: &str = "HOOK_REQUEST_MALFORMED";
pub const HOOK_AUTH_MISSING_OWNER: &str = "HOOK_AUTH_MISSING_OWNER";
pub const HOOK_WEBHOOK_INVALID_URL: &str = "HOOK_WEBHOOK_INVALID_URL";
pub const HOOK_WEBHOOK_VALIDATION_FAILED: &str = "HOOK_WEBHOOK_VALIDATION_FAILED";
pub const HOOK_WEBHOOK_NOT_FOUND: &str = "HOOK_WEBHOOK_NOT_FOUND";
pub const HOOK_WEBHOOK_CONFLICT: &str = "HOOK_WEBHOOK_CONFLICT";
pub const HOOK_STORAGE_UNAVAILABLE: &str = "HOOK_STORAGE_UNAVAILABLE";

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn given_problem_when_rendered_should_use_problem_json_content_type() {
        let response = problem(
            StatusCode::NOT_FOUND,
            HOOK_WEBHOOK_NOT_FOUND,
            Some("webhook not found".to_string()),
            Some("/webhooks/x".to_string()),
            Some("trace-1".to_string()),
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["code"], HOOK_WEBHOOK_NOT_FOUND);
        assert_eq!(json["trace_id"], "trace-1");
    }
}
