//! HTTP surface: the form page and the "Predict" handler

use crate::context::AppContext;
use crate::error::PredictError;
use crate::form::FormState;
use crate::metrics::InferenceMetrics;
use crate::render::{Outcome, Page};
use anyhow::{Context, Result};
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared state handed to every handler.
pub struct ServerState {
    pub context: Arc<AppContext>,
    pub metrics: Arc<InferenceMetrics>,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(bind_addr: &str, state: Arc<ServerState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Serving form on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        // Without a handler the server runs until the process is killed
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn health() -> &'static str {
    "ok"
}

async fn index() -> Html<String> {
    let form = FormState::default();
    Html(
        Page {
            form: &form,
            outcome: Outcome::Empty,
        }
        .render(),
    )
}

async fn predict(
    State(state): State<Arc<ServerState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let form = match FormState::from_submission(&fields) {
        Ok(form) => form,
        Err(e) => {
            warn!(error = %e, "Rejected form submission");
            let form = FormState::lenient(&fields);
            let page = Page {
                form: &form,
                outcome: Outcome::Rejected(e.to_string()),
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page.render())).into_response();
        }
    };

    let context = state.context.clone();
    let (model, features) = (form.model, form.features);
    let start = Instant::now();

    // Model evaluation is CPU-bound; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || context.engine.predict(model, &features))
        .await
        .map_err(|e| PredictError::Task(e.to_string()))
        .and_then(|result| result);
    let latency = start.elapsed();

    match outcome {
        Ok(result) => {
            state
                .metrics
                .record_prediction(model, latency, result.risk_class);
            info!(
                prediction_id = %result.prediction_id,
                model = %model.slug(),
                probability = result.probability,
                risk_class = %result.risk_class,
                latency_us = latency.as_micros() as u64,
                "Prediction served"
            );
            let page = Page {
                form: &form,
                outcome: Outcome::Prediction {
                    result: &result,
                    advice: &state.context.advice,
                },
            };
            Html(page.render()).into_response()
        }
        Err(e) => {
            state.metrics.record_failure();
            error!(model = %model.slug(), error = %e, "Prediction failed");
            let page = Page {
                form: &form,
                outcome: Outcome::Failed,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page.render())).into_response()
        }
    }
}
