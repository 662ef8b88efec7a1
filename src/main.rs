//! Blood Loss Risk Predictor - Main Entry Point
//!
//! Loads the classifiers and the scaler once, then serves the prediction form.

use anyhow::{Context, Result};
use blood_loss_risk::{
    config::{self, AppConfig, LoggingConfig},
    metrics::{InferenceMetrics, MetricsReporter},
    server::{self, ServerState},
    AppContext,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Relative artifact paths resolve against the application root
    let root = config::app_root()?;
    std::env::set_current_dir(&root)
        .with_context(|| format!("Failed to enter application root {}", root.display()))?;

    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!(root = %root.display(), "Starting Blood Loss Risk Predictor");
    info!(
        models_dir = %config.artifacts.models_dir,
        scaler = %config.artifacts.scaler_file,
        "Configuration loaded successfully"
    );

    let context = Arc::new(AppContext::load(&config)?);
    info!(
        "Inference engine initialized with {} models: {:?}",
        context.engine.registry().len(),
        context
            .engine
            .registry()
            .kinds()
            .map(|k| k.display_name())
            .collect::<Vec<_>>()
    );

    let metrics = Arc::new(InferenceMetrics::new());
    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    let state = Arc::new(ServerState {
        context,
        metrics: metrics.clone(),
    });
    server::serve(&config.server.bind_addr, state).await?;

    info!("Predictor shutting down...");
    metrics.print_summary();

    Ok(())
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!(
            "blood_loss_risk={level},tower_http={level}",
            level = logging.level
        )),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if logging.format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
