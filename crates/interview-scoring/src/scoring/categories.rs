use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::blend::round2;
use super::features::FeatureRecord;

const CATEGORY_JITTER: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryName {
    #[serde(rename = "Communication Skills")]
    CommunicationSkills,
    #[serde(rename = "Technical Knowledge")]
    TechnicalKnowledge,
    #[serde(rename = "Problem Solving")]
    ProblemSolving,
    #[serde(rename = "Cultural Fit")]
    CulturalFit,
    #[serde(rename = "Confidence & Clarity")]
    ConfidenceAndClarity,
}

impl CategoryName {
    pub const ALL: [CategoryName; 5] = [
        CategoryName::CommunicationSkills,
        CategoryName::TechnicalKnowledge,
        CategoryName::ProblemSolving,
        CategoryName::CulturalFit,
        CategoryName::ConfidenceAndClarity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CategoryName::CommunicationSkills => "Communication Skills",
            CategoryName::TechnicalKnowledge => "Technical Knowledge",
            CategoryName::ProblemSolving => "Problem Solving",
            CategoryName::CulturalFit => "Cultural Fit",
            CategoryName::ConfidenceAndClarity => "Confidence & Clarity",
        }
    }

    /// Deterministic shift applied before jitter.
    fn offset(self, features: &FeatureRecord) -> f64 {
        match self {
            CategoryName::TechnicalKnowledge => (features.technical_score * 0.4).min(8.0),
            CategoryName::CommunicationSkills => -(features.negative_score * 0.5).min(10.0),
            CategoryName::ConfidenceAndClarity => -(features.negative_score * 0.6).min(12.0),
            CategoryName::ProblemSolving | CategoryName::CulturalFit => 0.0,
        }
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub model_score: f64,
    /// Distance from the blended score; a rough per-category confidence signal.
    pub variance: f64,
}

pub type CategoryBreakdown = BTreeMap<CategoryName, CategoryScore>;

/// Derive named sub-scores from the blended score.
pub fn synthesize_categories<R: Rng + ?Sized>(
    blended_score: f64,
    features: &FeatureRecord,
    rng: &mut R,
) -> CategoryBreakdown {
    CategoryName::ALL
        .iter()
        .map(|&category| {
            let jitter = rng.gen_range(-CATEGORY_JITTER..=CATEGORY_JITTER);
            let model_score =
                round2((blended_score + category.offset(features) + jitter).clamp(0.0, 100.0));
            let variance = round2((model_score - blended_score).abs());
            (
                category,
                CategoryScore {
                    model_score,
                    variance,
                },
            )
        })
        .collect()
}
