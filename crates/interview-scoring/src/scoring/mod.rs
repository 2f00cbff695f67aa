//! Hybrid interview transcript scoring.
//!
//! A transcript is reduced to a [`FeatureRecord`], scored by the trained model when the
//! artifact carries one (falling back to the rule-based scorer otherwise), blended with
//! heuristic adjustments, and optionally expanded into category sub-scores and an
//! agreement report against an externally supplied score.

pub mod agreement;
pub mod blend;
pub mod categories;
pub mod features;
pub mod heuristic;
pub mod model;
pub mod router;
pub mod service;
pub mod transcript;
mod vocabulary;

#[cfg(test)]
mod tests;

pub use agreement::{classify_agreement, AgreementLevel, AgreementReport};
pub use blend::{blend, BlendedScore, ScoringMethod};
pub use categories::{synthesize_categories, CategoryBreakdown, CategoryName, CategoryScore};
pub use features::{extract, FeatureRecord};
pub use model::{ArtifactLoadError, ModelArtifact, ModelMetadata, PredictionError};
pub use router::scoring_router;
pub use service::{RandomSource, ScoringService, ScoringServiceError};
pub use transcript::{TranscriptError, TranscriptInput, TranscriptMessage};
pub use vocabulary::{encode_level, encode_role, DEFAULT_LEVEL_INDEX, DEFAULT_ROLE_INDEX};

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

pub const DEFAULT_ROLE: &str = "Software Engineer";
pub const DEFAULT_LEVEL: &str = "Mid-level";

/// Input to the engine. Optional stages are selected by the request shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRequest {
    pub text: String,
    pub role: String,
    pub level: String,
    pub include_categories: bool,
    /// Independent score (human or LLM) to classify agreement against.
    pub external_score: Option<f64>,
    pub classify_agreement: bool,
}

impl ScoreRequest {
    pub fn new(text: impl Into<String>, role: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: role.into(),
            level: level.into(),
            include_categories: false,
            external_score: None,
            classify_agreement: false,
        }
    }

    /// Enable category synthesis and agreement classification.
    pub fn detailed(mut self, external_score: Option<f64>) -> Self {
        self.include_categories = true;
        self.classify_agreement = true;
        self.external_score = external_score;
        self
    }
}

/// Outcome of a single scoring request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub final_score: f64,
    pub method: ScoringMethod,
    pub blend: BlendedScore,
    pub features: FeatureRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_scores: Option<CategoryBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement: Option<AgreementReport>,
}

/// Stateless scorer over a read-only artifact shared by every request.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    artifact: Option<Arc<ModelArtifact>>,
}

impl ScoringEngine {
    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        Self {
            artifact: Some(artifact),
        }
    }

    /// Engine with no artifact at all; every request is scored by the rules.
    pub fn without_artifact() -> Self {
        Self { artifact: None }
    }

    pub fn from_optional(artifact: Option<Arc<ModelArtifact>>) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> Option<&ModelArtifact> {
        self.artifact.as_deref()
    }

    pub fn score<R: Rng + ?Sized>(&self, request: &ScoreRequest, rng: &mut R) -> ScoreResult {
        info!(
            role = %request.role,
            level = %request.level,
            text_len = request.text.len(),
            "scoring transcript"
        );

        let features = extract(&request.text, &request.role, &request.level);
        debug!(
            word_count = features.word_count,
            technical_terms = features.technical_term_count,
            technical_score = features.technical_score,
            positive_indicators = features.positive_keyword_count,
            positive_score = features.positive_score,
            negative_indicators = features.negative_indicator_count,
            negative_score = features.negative_score,
            specific_examples = features.specific_example_count,
            lexical_diversity = features.lexical_diversity,
            "feature analysis"
        );

        let raw_model_score = self
            .artifact
            .as_deref()
            .and_then(|artifact| model::predict(artifact, &features));
        let blended = blend(raw_model_score, &features, rng);

        info!(
            score = blended.score,
            method = blended.method.label(),
            "transcript scored"
        );

        let category_scores = request
            .include_categories
            .then(|| synthesize_categories(blended.score, &features, rng));
        let agreement = request
            .classify_agreement
            .then(|| AgreementReport::compare(request.external_score, blended.score));

        ScoreResult {
            final_score: blended.score,
            method: blended.method,
            blend: blended,
            features,
            category_scores,
            agreement,
        }
    }
}
