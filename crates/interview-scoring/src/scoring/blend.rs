use rand::Rng;
use serde::{Deserialize, Serialize};

use super::features::FeatureRecord;
use super::heuristic::{self, clamp_published, BASE_SCORE};
use super::vocabulary::{is_data_title, SENIOR_LEVEL};

/// Model scores at or beyond these bounds are treated as mispredictions.
pub const PLAUSIBLE_MODEL_BAND: (f64, f64) = (20.0, 80.0);

const NOISE_MAGNITUDE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    Model,
    Heuristic,
}

impl ScoringMethod {
    pub fn label(self) -> &'static str {
        match self {
            ScoringMethod::Model => "Trained ML Model",
            ScoringMethod::Heuristic => "Advanced Rule-Based",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedScore {
    pub score: f64,
    pub method: ScoringMethod,
    /// Raw model output, when the model produced one.
    pub model_score: Option<f64>,
    /// Whether the model output fell inside the plausible band and was used as the anchor.
    pub model_trusted: bool,
    pub adjustment: f64,
}

/// Combine an optional raw model score with heuristic adjustments into the final score.
pub fn blend<R: Rng + ?Sized>(
    raw_model_score: Option<f64>,
    features: &FeatureRecord,
    rng: &mut R,
) -> BlendedScore {
    let (pre_noise, method, model_trusted, adjustment) = match raw_model_score {
        None => (
            heuristic::score(features, rng),
            ScoringMethod::Heuristic,
            false,
            0.0,
        ),
        Some(model_score) => {
            let adjustment = model_adjustment(features);
            let trusted = is_plausible(model_score);
            let anchor = if trusted { model_score } else { BASE_SCORE };
            (anchor + adjustment, ScoringMethod::Model, trusted, adjustment)
        }
    };

    let noisy = pre_noise.clamp(0.0, 100.0) + rng.gen_range(-NOISE_MAGNITUDE..=NOISE_MAGNITUDE);

    BlendedScore {
        score: clamp_published(round2(noisy)),
        method,
        model_score: raw_model_score,
        model_trusted,
        adjustment,
    }
}

pub fn is_plausible(model_score: f64) -> bool {
    let (low, high) = PLAUSIBLE_MODEL_BAND;
    model_score > low && model_score < high
}

/// Same signal families as the rule-based tiers, with the model path's own coefficients.
pub fn model_adjustment(features: &FeatureRecord) -> f64 {
    let mut adjustment = 0.0;

    if features.lexical_diversity > 50.0 {
        adjustment += 2.0;
    } else if features.lexical_diversity < 20.0 {
        adjustment -= 5.0;
    }

    if features.level_encoded == SENIOR_LEVEL {
        if features.technical_score < 15.0 {
            adjustment -= 8.0;
        } else if features.word_count < 200 {
            adjustment -= 5.0;
        }
    }

    if is_data_title(&features.role) && features.technical_score < 8.0 {
        adjustment -= 6.0;
    }

    adjustment
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
