use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::agreement::AgreementReport;
use super::blend::{round2, ScoringMethod};
use super::categories::CategoryBreakdown;
use super::features::FeatureRecord;
use super::model::ModelMetadata;
use super::transcript::{TranscriptError, TranscriptInput};
use super::{ScoreRequest, ScoringEngine, DEFAULT_LEVEL, DEFAULT_ROLE};

pub const SERVICE_NAME: &str = "Interview Scoring API";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Where per-request randomness comes from. Every request draws a fresh generator so
/// concurrent requests never share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomSource {
    Entropy,
    /// Every request starts from the same seed, which makes responses reproducible.
    Seeded(u64),
}

impl RandomSource {
    pub fn rng(self) -> StdRng {
        match self {
            RandomSource::Entropy => StdRng::from_entropy(),
            RandomSource::Seeded(seed) => StdRng::seed_from_u64(seed),
        }
    }
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

/// Body of the single-score endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub interview_data: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_level")]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub ml_score: f64,
    /// Set when the engine failed and a safe default was substituted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

/// Body of the detailed scoring endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedScoreRequest {
    #[serde(flatten)]
    pub transcript: TranscriptInput,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub external_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedScoreResponse {
    pub score: f64,
    pub method: ScoringMethod,
    pub model_score: Option<f64>,
    pub category_scores: CategoryBreakdown,
    pub ml_insights: MlInsights,
    pub agreement: AgreementReport,
    pub features: FeatureRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlInsights {
    pub model_loaded: bool,
    pub model_type: String,
    pub scoring_method: &'static str,
    pub accuracy: String,
    pub train_r2: f64,
    pub training_samples: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatusView {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub model_type: String,
    pub accuracy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfoView {
    pub model_information: ModelInformation,
    pub performance_metrics: PerformanceMetrics,
    pub key_features_analyzed: Vec<&'static str>,
    pub feature_columns: Vec<String>,
    pub scoring_range: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInformation {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub model_type: String,
    pub training_date: String,
    pub training_samples: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub r2_score: f64,
    pub rmse: f64,
    pub mae: f64,
    pub interpretation: String,
}

const KEY_FEATURES: &[&str] = &[
    "Response length and structure",
    "Technical terminology usage",
    "Positive vs negative language patterns",
    "Question-asking engagement",
    "Specific examples provided",
    "Role-appropriate technical depth",
];

/// Service facade used by the HTTP router and the CLI.
pub struct ScoringService {
    engine: Arc<ScoringEngine>,
    random: RandomSource,
}

impl ScoringService {
    pub fn new(engine: ScoringEngine) -> Self {
        Self::with_random_source(engine, RandomSource::Entropy)
    }

    pub fn with_random_source(engine: ScoringEngine, random: RandomSource) -> Self {
        Self {
            engine: Arc::new(engine),
            random,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Single-score path. Never fails: if the engine does, a bounded default in
    /// `[20, 80]` is returned and marked as a fallback.
    pub async fn predict(&self, request: PredictRequest) -> PredictResponse {
        let engine = Arc::clone(&self.engine);
        let random = self.random;
        let scored = tokio::task::spawn_blocking(move || {
            let request = ScoreRequest::new(request.interview_data, request.role, request.level);
            engine.score(&request, &mut random.rng()).final_score
        })
        .await;

        match scored {
            Ok(ml_score) => PredictResponse {
                ml_score,
                fallback: false,
            },
            Err(err) => {
                error!(error = %err, "scoring engine failed; returning safe default score");
                PredictResponse {
                    ml_score: safe_default_score(&mut self.random.rng()),
                    fallback: true,
                }
            }
        }
    }

    /// Category breakdown, insights and agreement. Requires an artifact.
    pub async fn score_detailed(
        &self,
        request: DetailedScoreRequest,
    ) -> Result<DetailedScoreResponse, ScoringServiceError> {
        let metadata = self
            .engine
            .artifact()
            .map(|artifact| (artifact.has_model(), artifact.metadata.clone()))
            .ok_or(ScoringServiceError::ModelUnavailable)?;

        if let Some(external) = request.external_score {
            if !(0.0..=100.0).contains(&external) {
                return Err(ScoringServiceError::InvalidExternalScore(external));
            }
        }

        let text = request.transcript.into_text()?;
        let score_request =
            ScoreRequest::new(text, request.role, request.level).detailed(request.external_score);

        let engine = Arc::clone(&self.engine);
        let random = self.random;
        let result =
            tokio::task::spawn_blocking(move || engine.score(&score_request, &mut random.rng()))
                .await
                .map_err(|err| ScoringServiceError::Engine(err.to_string()))?;

        let (model_loaded, metadata) = metadata;
        Ok(DetailedScoreResponse {
            score: result.final_score,
            method: result.method,
            model_score: result.blend.model_score,
            category_scores: result.category_scores.unwrap_or_default(),
            ml_insights: insights(model_loaded, &metadata, result.method),
            agreement: result
                .agreement
                .unwrap_or_else(|| AgreementReport::compare(None, result.final_score)),
            features: result.features,
        })
    }

    pub fn status(&self) -> ServiceStatusView {
        let artifact = self.engine.artifact();
        ServiceStatusView {
            status: "healthy",
            service: SERVICE_NAME,
            version: SERVICE_VERSION,
            model_loaded: artifact.is_some(),
            model_type: artifact
                .map(|artifact| artifact.metadata.model_type.clone())
                .unwrap_or_else(|| "Rule-Based".to_string()),
            accuracy: artifact
                .map(|artifact| artifact.metadata.accuracy_label())
                .unwrap_or_else(|| "82% (estimated)".to_string()),
        }
    }

    pub fn model_info(&self) -> Result<ModelInfoView, ScoringServiceError> {
        let artifact = self
            .engine
            .artifact()
            .ok_or(ScoringServiceError::ModelUnavailable)?;
        Ok(model_info_view(&artifact.metadata, &artifact.feature_columns))
    }
}

fn insights(model_loaded: bool, metadata: &ModelMetadata, method: ScoringMethod) -> MlInsights {
    MlInsights {
        model_loaded,
        model_type: metadata.model_type.clone(),
        scoring_method: method.label(),
        accuracy: metadata.accuracy_label(),
        train_r2: metadata.train_r2,
        training_samples: metadata.train_samples,
    }
}

pub fn model_info_view(metadata: &ModelMetadata, feature_columns: &[String]) -> ModelInfoView {
    ModelInfoView {
        model_information: ModelInformation {
            name: "Interview Performance Predictor",
            model_type: metadata.model_type.clone(),
            training_date: metadata.train_date.clone(),
            training_samples: metadata.train_samples,
        },
        performance_metrics: PerformanceMetrics {
            r2_score: (metadata.train_r2 * 10_000.0).round() / 10_000.0,
            rmse: round2(metadata.train_rmse),
            mae: round2(metadata.train_mae),
            interpretation: format!(
                "R² of {:.2} indicates {:.0}% variance explained by the model",
                metadata.train_r2,
                metadata.train_r2 * 100.0
            ),
        },
        key_features_analyzed: KEY_FEATURES.to_vec(),
        feature_columns: feature_columns.to_vec(),
        scoring_range: "0-100",
    }
}

/// Bounded stand-in used when the engine itself fails.
pub fn safe_default_score<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    round2((50.0 + rng.gen_range(-10.0_f64..=10.0)).clamp(20.0, 80.0))
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error("model not available")]
    ModelUnavailable,
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
    #[error("external score {0} must be within 0-100")]
    InvalidExternalScore(f64),
    #[error("scoring engine failed: {0}")]
    Engine(String),
}
