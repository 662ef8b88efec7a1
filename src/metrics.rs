//! Inference statistics, kept in memory and summarized in the log.

use crate::models::registry::ModelKind;
use crate::types::prediction::RiskClass;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept per model.
const LATENCY_WINDOW: usize = 1000;

/// Metrics collector for served predictions
pub struct InferenceMetrics {
    /// Total successful predictions
    pub predictions: AtomicU64,
    /// Total failed predictions
    pub failures: AtomicU64,
    /// Predictions by risk class
    by_class: RwLock<HashMap<RiskClass, u64>>,
    /// Per-model inference times (in microseconds)
    model_times: RwLock<HashMap<ModelKind, Vec<u64>>>,
    /// Start time for uptime
    start_time: Instant,
}

impl InferenceMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            by_class: RwLock::new(HashMap::new()),
            model_times: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, model: ModelKind, latency: Duration, risk_class: RiskClass) {
        self.predictions.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_class) = self.by_class.write() {
            *by_class.entry(risk_class).or_insert(0) += 1;
        }

        if let Ok(mut times) = self.model_times.write() {
            let model_times = times.entry(model).or_default();
            model_times.push(latency.as_micros() as u64);
            if model_times.len() > LATENCY_WINDOW {
                model_times.drain(0..LATENCY_WINDOW / 2);
            }
        }
    }

    /// Record a failed prediction
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of predictions per risk class
    pub fn class_count(&self, risk_class: RiskClass) -> u64 {
        self.by_class
            .read()
            .ok()
            .and_then(|by_class| by_class.get(&risk_class).copied())
            .unwrap_or(0)
    }

    /// Get model performance stats
    pub fn get_model_stats(&self) -> HashMap<ModelKind, ModelStats> {
        let Ok(times) = self.model_times.read() else {
            return HashMap::new();
        };

        times
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(model, samples)| {
                let mut sorted = samples.clone();
                sorted.sort_unstable();
                let count = sorted.len();
                let sum: u64 = sorted.iter().sum();

                (
                    *model,
                    ModelStats {
                        calls: count as u64,
                        mean_us: sum / count as u64,
                        p50_us: sorted[count / 2],
                        p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
                    },
                )
            })
            .collect()
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let predictions = self.predictions.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);

        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            predictions,
            failures,
            high_risk = self.class_count(RiskClass::High),
            low_risk = self.class_count(RiskClass::Low),
            "Inference summary"
        );

        let model_stats = self.get_model_stats();
        for kind in ModelKind::ALL {
            if let Some(stats) = model_stats.get(&kind) {
                info!(
                    model = %kind.slug(),
                    calls = stats.calls,
                    mean_us = stats.mean_us,
                    p50_us = stats.p50_us,
                    p99_us = stats.p99_us,
                    "Model inference times"
                );
            }
        }
    }
}

impl Default for InferenceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Model-specific statistics
#[derive(Debug)]
pub struct ModelStats {
    pub calls: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
}

/// Periodic summary logger
pub struct MetricsReporter {
    metrics: Arc<InferenceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<InferenceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = InferenceMetrics::new();

        metrics.record_prediction(ModelKind::Knn, Duration::from_micros(100), RiskClass::Low);
        metrics.record_prediction(ModelKind::Knn, Duration::from_micros(300), RiskClass::High);
        metrics.record_prediction(ModelKind::Svm, Duration::from_micros(50), RiskClass::Low);
        metrics.record_failure();

        assert_eq!(metrics.predictions.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.class_count(RiskClass::Low), 2);
        assert_eq!(metrics.class_count(RiskClass::High), 1);

        let stats = metrics.get_model_stats();
        assert_eq!(stats[&ModelKind::Knn].calls, 2);
        assert_eq!(stats[&ModelKind::Knn].mean_us, 200);
        assert!(!stats.contains_key(&ModelKind::RandomForest));
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let metrics = InferenceMetrics::new();
        for i in 0..(LATENCY_WINDOW as u64 + 1) {
            metrics.record_prediction(ModelKind::DecisionTree, Duration::from_micros(i), RiskClass::Low);
        }

        let stats = metrics.get_model_stats();
        assert_eq!(stats[&ModelKind::DecisionTree].calls, (LATENCY_WINDOW / 2 + 1) as u64);
    }
}
