//! Route definitions and handlers.

use std::sync::Arc;

use axum::{Json, Router, extract::State, response::Html, routing::get};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use cgscope::{ProbeConfig, probe};

use crate::html;

/// Build the router. The probe configuration is shared, read-only state.
pub fn app(config: ProbeConfig) -> Router {
    Router::new()
        .route("/", get(report))
        .route("/version", get(version))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(config))
}

/// Run a probe and render it as HTML.
///
/// The probe blocks for the sampling interval, so it runs on the blocking
/// pool; concurrent requests each get their own probe. Errors render as an
/// error page with status 200, never 500.
async fn report(State(config): State<Arc<ProbeConfig>>) -> Html<String> {
    let result = tokio::task::spawn_blocking(move || probe::run(&config)).await;
    let page = match result {
        Ok(Ok(report)) => html::render_page(&report),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "probe failed");
            html::render_error_page(&err.to_string())
        }
        Err(err) => {
            tracing::error!(error = %err, "probe task panicked");
            html::render_error_page(&format!("report task failed: {err}"))
        }
    };
    Html(page)
}

async fn version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}
