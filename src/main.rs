use hookshot::application::context::AppContext;
use hookshot::config;
use hookshot::infrastructure::db::postgres::PostgresDatabase;
use hookshot::infrastructure::db::repositories::Repositories;
use hookshot::infrastructure::transport::ReqwestTransport;
use hookshot::interface::http;
use hookshot::interface::http::state::AppState;
use hookshot::observability;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Step 1: Load configuration and install logging and metrics.
    let settings = config::load().expect("load config");
    observability::init_tracing(&settings.observability);
    let metrics = observability::init_metrics(&settings.observability).expect("install metrics");

    // Step 2: Pick the subscription store.
    let repos = match settings.db.url.as_deref() {
        Some(url) => {
            let db = Arc::new(
                PostgresDatabase::connect(url, settings.db.max_connections)
                    .await
                    .expect("connect database"),
            );
            info!("using postgres subscription store");
            Repositories::postgres(db)
        }
        None => {
            warn!("db.url not set, subscriptions are kept in memory");
            Repositories::in_memory()
        }
    };

    // Step 3: Build the outbound transport.
    let transport = ReqwestTransport::new(
        settings.delivery.request_timeout(),
        settings.delivery.verify_resolved_addresses,
    )
    .expect("build http client");

    // Step 4: Assemble shared application context and HTTP state.
    let ctx = AppContext::new(repos, Arc::new(transport), settings.clone());
    let state = AppState {
        ctx: Arc::new(ctx),
        metrics,
    };

    // Step 5: Build the HTTP app.
    let app = http::app(state);
    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);

    // Step 6: Bind and serve.
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("bind server");
    info!(addr = %bind_addr, "hookshot listening");

    axum::serve(listener, app).await.expect("serve");
}
