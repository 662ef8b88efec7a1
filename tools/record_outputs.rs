//! Artifact Output Recorder
//!
//! Runs every shipped classifier on the population-mean case and on the
//! reference scenario, printing one JSON line per prediction. Used to pin
//! artifact-dependent expectations after retraining:
//!
//! ```text
//! cargo run --bin record-outputs > models_saved/recorded_outputs.jsonl
//! ```

use anyhow::{Context, Result};
use blood_loss_risk::{config, AppConfig, AppContext, FeatureVector, ModelKind};
use serde_json::json;
use tracing::info;

/// Reference case, rounded the way a user would type it.
fn scenario() -> FeatureVector {
    FeatureVector::from_values([110.55, 232.08, 341.33, 167.24, 5.34, 18.39, 23.73, 681.02])
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blood_loss_risk=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let root = config::app_root()?;
    std::env::set_current_dir(&root)
        .with_context(|| format!("Failed to enter application root {}", root.display()))?;

    let config = AppConfig::load()?;
    let context = AppContext::load(&config)?;
    info!(root = %root.display(), "Recording outputs");

    let cases = [("defaults", FeatureVector::defaults()), ("scenario", scenario())];

    for (case, features) in &cases {
        for kind in ModelKind::ALL {
            let result = context
                .engine
                .predict(kind, features)
                .with_context(|| format!("{} failed on {} case", kind, case))?;

            println!(
                "{}",
                json!({
                    "case": case,
                    "model": kind.display_name(),
                    "probability": result.probability,
                    "label": result.risk_class.label(),
                    "verdict": result.risk_class.verdict(),
                })
            );
        }
    }

    Ok(())
}
