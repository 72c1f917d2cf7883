use crate::domain::value_objects::ids::OwnerId;
use crate::interface::http::problem::{HOOK_AUTH_MISSING_OWNER, problem};
use crate::interface::http::trace::TraceId;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

/// Header carrying the authenticated account id, set by the upstream auth layer.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Resolves the caller's `OwnerId` from `x-owner-id` and injects it into the request.
///
/// Applied as a route layer on the webhook routes only; other paths never see it.
pub async fn owner_middleware(mut req: Request<Body>, next: Next) -> Result<Response, Response> {
    let trace_id = req.extensions().get::<TraceId>().map(|t| t.0.clone());

    // Step 1: parse the owner header.
    let owner = req
        .headers()
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<OwnerId>().ok());
    let Some(owner) = owner else {
        return Err(problem(
            StatusCode::UNAUTHORIZED,
            HOOK_AUTH_MISSING_OWNER,
            Some("missing or malformed x-owner-id header".to_string()),
            Some(req.uri().path().to_string()),
            trace_id,
        ));
    };

    // Step 2: attach the owner for handlers.
    req.extensions_mut().insert(owner);
    Ok(next.run(req).await)
}
