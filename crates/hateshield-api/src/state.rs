//! Shared application state

use crate::config::Settings;
use crate::error::AppError;
use hateshield_classifiers::InferenceAdapter;
use hateshield_core::Error;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Shared model handle; loaded once for the process lifetime
    pub adapter: Arc<InferenceAdapter>,

    pub settings: Arc<Settings>,

    /// Prometheus renderer, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(adapter: Arc<InferenceAdapter>, settings: Settings) -> Self {
        Self {
            adapter,
            settings: Arc::new(settings),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Log a failed analysis and turn it into a response
    pub fn fail(&self, context: &str, err: Error) -> AppError {
        tracing::error!(error = ?err, "{}: {}", context, err);
        metrics::counter!("hateshield_errors_total", "kind" => err.kind()).increment(1);
        AppError::from_core(err, self.settings.server.expose_error_details)
    }
}
