use std::sync::Arc;

use axum::response::Response;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use crate::scoring::features::FeatureRecord;
use crate::scoring::model::{ModelArtifact, PredictionError, Predictor};
use crate::scoring::service::{RandomSource, ScoringService};
use crate::scoring::{scoring_router, ScoringEngine};

pub(super) const STRONG_ANSWER: &str = "In my last role I led the migration of our payments \
platform to a microservice architecture on kubernetes. I designed the api contracts, \
implemented a rest gateway and optimized the database schema, which improved p99 latency by \
40 percent. For example, we replaced a monolithic batch job with a scalable pipeline and \
delivered it in 6 weeks. I collaborated with product and mentored two junior engineers on \
testing and ci/cd practices. We deployed to aws with containers and successfully reduced \
infrastructure cost by 25 percent. When a production incident happened I resolved it within \
an hour by adding unit test coverage and tracing around the failing service. What does the \
team's current deployment process look like?";

pub(super) const WEAK_ANSWER: &str = "Um, I think I just did some basic stuff, like, maybe \
fixing things. Not sure really.";

pub(super) fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

/// Mid-sized, unremarkable record that clears every catastrophic gate.
pub(super) fn record() -> FeatureRecord {
    FeatureRecord {
        word_count: 150,
        technical_term_count: 7,
        positive_keyword_count: 6,
        negative_indicator_count: 2,
        question_count: 1,
        specific_example_count: 2,
        avg_response_length: 15.0,
        lexical_diversity: 55.0,
        role: "Backend Engineer".to_string(),
        level: "Senior".to_string(),
        role_encoded: 4,
        level_encoded: 2,
        technical_score: 14.0,
        positive_score: 9.0,
        negative_score: 4.0,
    }
}

#[derive(Debug)]
pub(super) struct FixedPredictor(pub(super) f64);

impl Predictor for FixedPredictor {
    fn predict(&self, _input: &[f64]) -> Result<f64, PredictionError> {
        Ok(self.0)
    }

    fn kind(&self) -> &'static str {
        "Fixed"
    }

    fn input_len(&self) -> usize {
        9
    }
}

#[derive(Debug)]
pub(super) struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn predict(&self, _input: &[f64]) -> Result<f64, PredictionError> {
        Err(PredictionError::Predictor("model file truncated".to_string()))
    }

    fn kind(&self) -> &'static str {
        "Failing"
    }

    fn input_len(&self) -> usize {
        9
    }
}

#[derive(Debug)]
pub(super) struct PanickingPredictor;

impl Predictor for PanickingPredictor {
    fn predict(&self, _input: &[f64]) -> Result<f64, PredictionError> {
        panic!("predictor crashed")
    }

    fn kind(&self) -> &'static str {
        "Panicking"
    }

    fn input_len(&self) -> usize {
        9
    }
}

pub(super) fn artifact_with(predictor: impl Predictor + 'static) -> ModelArtifact {
    let mut artifact = ModelArtifact::fallback();
    artifact.model = Some(Box::new(predictor));
    artifact
}

pub(super) fn engine_with(predictor: impl Predictor + 'static) -> ScoringEngine {
    ScoringEngine::new(Arc::new(artifact_with(predictor)))
}

pub(super) fn fallback_engine() -> ScoringEngine {
    ScoringEngine::new(Arc::new(ModelArtifact::fallback()))
}

pub(super) fn router_for(engine: ScoringEngine) -> axum::Router {
    scoring_router(Arc::new(ScoringService::with_random_source(
        engine,
        RandomSource::Seeded(11),
    )))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
