use interview_scoring::config::AppConfig;
use interview_scoring::error::AppError;
use interview_scoring::scoring::{ModelArtifact, ScoringEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Environment configuration with the command-line artifact override applied.
pub(crate) fn load_config(model_path: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = model_path {
        config.scoring.model_path = path;
    }
    Ok(config)
}

/// Resolve the artifact once; the engine shares it read-only from here on.
pub(crate) fn load_engine(config: &AppConfig) -> ScoringEngine {
    ScoringEngine::from_optional(ModelArtifact::open(&config.scoring).map(Arc::new))
}
