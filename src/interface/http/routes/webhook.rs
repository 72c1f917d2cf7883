// HTTP routes: webhook subscription management.

use crate::application::usecases::list_webhooks::ListWebhooksUseCase;
use crate::application::usecases::register_webhook::{
    RegisterWebhookCommand, RegisterWebhookError, RegisterWebhookUseCase,
};
use crate::application::usecases::test_webhook::{TestWebhookError, TestWebhookUseCase};
use crate::application::usecases::unregister_webhook::{
    UnregisterWebhookError, UnregisterWebhookUseCase,
};
use crate::application::usecases::update_webhook::{
    UpdateWebhookCommand, UpdateWebhookError, UpdateWebhookUseCase,
};
use crate::domain::value_objects::ids::{OwnerId, SubscriptionId};
use crate::interface::http::dto::webhook::{
    ListWebhooksResponse, RegisterWebhookRequest, TestWebhookResponse, UpdateWebhookRequest,
};
use crate::interface::http::problem::{
    HOOK_REQUEST_MALFORMED, HOOK_STORAGE_UNAVAILABLE, HOOK_WEBHOOK_CONFLICT,
    HOOK_WEBHOOK_INVALID_URL, HOOK_WEBHOOK_NOT_FOUND, HOOK_WEBHOOK_VALIDATION_FAILED, problem,
};
use crate::interface::http::state::AppState;
use crate::interface::http::trace::TraceId;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{patch, post};

/// Builds webhook routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/webhooks", post(register_webhook).get(list_webhooks))
        .route(
            "/webhooks/:webhook_id",
            patch(update_webhook).delete(unregister_webhook),
        )
        .route("/webhooks/:webhook_id/test", post(test_webhook))
}

fn malformed(detail: String, trace_id: &TraceId) -> Response {
    problem(
        StatusCode::BAD_REQUEST,
        HOOK_REQUEST_MALFORMED,
        Some(detail),
        None,
        Some(trace_id.0.clone()),
    )
}

fn not_found(webhook_id: &str, trace_id: &TraceId) -> Response {
    problem(
        StatusCode::NOT_FOUND,
        HOOK_WEBHOOK_NOT_FOUND,
        Some("webhook not found".to_string()),
        Some(format!("/webhooks/{webhook_id}")),
        Some(trace_id.0.clone()),
    )
}

fn storage_unavailable(trace_id: &TraceId) -> Response {
    problem(
        StatusCode::SERVICE_UNAVAILABLE,
        HOOK_STORAGE_UNAVAILABLE,
        Some("storage unavailable".to_string()),
        None,
        Some(trace_id.0.clone()),
    )
}

fn parse_id(raw: &str, trace_id: &TraceId) -> Result<SubscriptionId, Response> {
    raw.parse::<SubscriptionId>()
        .map_err(|_| malformed("invalid webhook_id".to_string(), trace_id))
}

/// Registers a webhook for the calling owner.
async fn register_webhook(
    State(state): State<AppState>,
    Extension(owner_id): Extension<OwnerId>,
    Extension(trace_id): Extension<TraceId>,
    payload: Result<Json<RegisterWebhookRequest>, JsonRejection>,
) -> Response {
    // Step 1: Parse the body.
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed(rejection.body_text(), &trace_id),
    };

    // Step 2: Execute the use case.
    let result = RegisterWebhookUseCase::execute(
        &state.ctx,
        RegisterWebhookCommand {
            owner_id,
            url: payload.url,
            secret: payload.secret,
            events: payload.events,
            description: payload.description,
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(RegisterWebhookError::InvalidUrl(err)) => problem(
            StatusCode::BAD_REQUEST,
            HOOK_WEBHOOK_INVALID_URL,
            Some(err.to_string()),
            None,
            Some(trace_id.0),
        ),
        Err(RegisterWebhookError::Validation(detail)) => problem(
            StatusCode::BAD_REQUEST,
            HOOK_WEBHOOK_VALIDATION_FAILED,
            Some(detail),
            None,
            Some(trace_id.0),
        ),
        Err(RegisterWebhookError::Conflict) => problem(
            StatusCode::CONFLICT,
            HOOK_WEBHOOK_CONFLICT,
            Some("webhook already exists".to_string()),
            None,
            Some(trace_id.0),
        ),
        Err(RegisterWebhookError::Storage(_)) => storage_unavailable(&trace_id),
    }
}

/// Lists the caller's webhooks.
async fn list_webhooks(
    State(state): State<AppState>,
    Extension(owner_id): Extension<OwnerId>,
    Extension(trace_id): Extension<TraceId>,
) -> Response {
    match ListWebhooksUseCase::execute(&state.ctx, owner_id).await {
        Ok(webhooks) => (StatusCode::OK, Json(ListWebhooksResponse { webhooks })).into_response(),
        Err(_) => storage_unavailable(&trace_id),
    }
}

/// Applies a partial update to one of the caller's webhooks.
async fn update_webhook(
    State(state): State<AppState>,
    Extension(owner_id): Extension<OwnerId>,
    Extension(trace_id): Extension<TraceId>,
    Path(webhook_id): Path<String>,
    payload: Result<Json<UpdateWebhookRequest>, JsonRejection>,
) -> Response {
    // Step 1: Parse the id and body.
    let id = match parse_id(&webhook_id, &trace_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed(rejection.body_text(), &trace_id),
    };

    // Step 2: Execute the use case.
    let result = UpdateWebhookUseCase::execute(
        &state.ctx,
        owner_id,
        id,
        UpdateWebhookCommand {
            url: payload.url,
            secret: payload.secret,
            events: payload.events,
            description: payload.description,
            active: payload.active,
        },
    )
    .await;

    // Step 3: Map output to HTTP response.
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(UpdateWebhookError::NotFound) => not_found(&webhook_id, &trace_id),
        Err(UpdateWebhookError::InvalidUrl(err)) => problem(
            StatusCode::BAD_REQUEST,
            HOOK_WEBHOOK_INVALID_URL,
            Some(err.to_string()),
            None,
            Some(trace_id.0),
        ),
        Err(UpdateWebhookError::Validation(detail)) => problem(
            StatusCode::BAD_REQUEST,
            HOOK_WEBHOOK_VALIDATION_FAILED,
            Some(detail),
            None,
            Some(trace_id.0),
        ),
        Err(UpdateWebhookError::Storage(_)) => storage_unavailable(&trace_id),
    }
}

/// Deletes one of the caller's webhooks.
async fn unregister_webhook(
    State(state): State<AppState>,
    Extension(owner_id): Extension<OwnerId>,
    Extension(trace_id): Extension<TraceId>,
    Path(webhook_id): Path<String>,
) -> Response {
    let id = match parse_id(&webhook_id, &trace_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match UnregisterWebhookUseCase::execute(&state.ctx, owner_id, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(UnregisterWebhookError::NotFound) => not_found(&webhook_id, &trace_id),
        Err(UnregisterWebhookError::Storage(_)) => storage_unavailable(&trace_id),
    }
}

/// Sends a single synthetic test delivery.
async fn test_webhook(
    State(state): State<AppState>,
    Extension(owner_id): Extension<OwnerId>,
    Extension(trace_id): Extension<TraceId>,
    Path(webhook_id): Path<String>,
) -> Response {
    let id = match parse_id(&webhook_id, &trace_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match TestWebhookUseCase::execute(&state.ctx, owner_id, id).await {
        Ok(outcome) => (StatusCode::OK, Json(TestWebhookResponse::from(outcome))).into_response(),
        Err(TestWebhookError::NotFound) => not_found(&webhook_id, &trace_id),
        Err(TestWebhookError::Storage(_)) => storage_unavailable(&trace_id),
    }
}
