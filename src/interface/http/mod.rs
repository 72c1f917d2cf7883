pub mod dto;
pub mod owner;
pub mod problem;
pub mod routes;
pub mod state;
pub mod trace;

use axum::Router;
use axum::middleware::from_fn;

use crate::interface::http::state::AppState;

/// Build the HTTP application with routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::ready::router())
        .merge(routes::metrics::router())
        .merge(routes::webhook::router().route_layer(from_fn(owner::owner_middleware)))
        .layer(from_fn(trace::request_log_middleware))
        .layer(from_fn(trace::trace_id_middleware))
        .with_state(state)
}
