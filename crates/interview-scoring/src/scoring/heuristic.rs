use rand::Rng;
use serde::{Deserialize, Serialize};

use super::features::FeatureRecord;
use super::vocabulary::{is_engineering_title, MID_LEVEL, SENIOR_LEVEL};

pub const SCORE_FLOOR: f64 = 5.0;
pub const SCORE_CEILING: f64 = 95.0;

/// Responses start here and must earn their way up.
pub const BASE_SCORE: f64 = 30.0;

const MINIMAL_RESPONSE_WORDS: u32 = 30;
const BRIEF_RESPONSE_WORDS: u32 = 50;
const SHORT_RESPONSE_WORDS: u32 = 100;
const GOOD_RESPONSE_MAX_WORDS: u32 = 300;
const SHORT_RESPONSE_CAP_WORDS: u32 = 80;
const HEAVY_NEGATIVE_SCORE: f64 = 15.0;
const NEGATIVE_CAP_SCORE: f64 = 8.0;

/// Early exit for degenerate responses, evaluated before any additive tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatastrophicGate {
    MinimalResponse,
    HeavyNegativeLanguage,
    BriefNonTechnical,
}

impl CatastrophicGate {
    fn detect(features: &FeatureRecord) -> Option<Self> {
        if features.word_count < MINIMAL_RESPONSE_WORDS {
            Some(Self::MinimalResponse)
        } else if features.negative_score > HEAVY_NEGATIVE_SCORE {
            Some(Self::HeavyNegativeLanguage)
        } else if features.word_count < BRIEF_RESPONSE_WORDS && features.technical_score < 2.0 {
            Some(Self::BriefNonTechnical)
        } else {
            None
        }
    }

    /// (anchor, jitter magnitude, floor)
    fn band(self) -> (f64, f64, f64) {
        match self {
            Self::MinimalResponse => (10.0, 3.0, 5.0),
            Self::HeavyNegativeLanguage => (15.0, 4.0, 10.0),
            Self::BriefNonTechnical => (18.0, 5.0, 10.0),
        }
    }
}

/// Additive tiers layered on top of [`BASE_SCORE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    ContentQuality,
    Communication,
    Professionalism,
    RoleAndLevel,
    LexicalDiversity,
}

/// Discrete contribution to a heuristic score so results can be audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDelta {
    pub tier: ScoreTier,
    pub delta: f64,
    pub notes: Vec<String>,
}

/// Ceiling applied after the additive tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryCap {
    ShortResponse,
    NegativeLanguage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicOutcome {
    pub score: f64,
    pub gate: Option<CatastrophicGate>,
    pub tiers: Vec<TierDelta>,
    pub caps: Vec<SecondaryCap>,
}

/// Rule-based score in `[5, 95]`; see [`evaluate`] for the audit trail.
pub fn score<R: Rng + ?Sized>(features: &FeatureRecord, rng: &mut R) -> f64 {
    evaluate(features, rng).score
}

/// Gates, then additive tiers, then secondary caps, then the hard clamp.
pub fn evaluate<R: Rng + ?Sized>(features: &FeatureRecord, rng: &mut R) -> HeuristicOutcome {
    if let Some(gate) = CatastrophicGate::detect(features) {
        let (anchor, jitter, floor) = gate.band();
        let gated = (anchor + rng.gen_range(-jitter..=jitter)).max(floor);
        return HeuristicOutcome {
            score: clamp_published(gated),
            gate: Some(gate),
            tiers: Vec::new(),
            caps: Vec::new(),
        };
    }

    let tiers = vec![
        content_quality(features),
        communication(features),
        professionalism(features),
        role_and_level(features),
        lexical_diversity(features),
    ];

    let mut total = BASE_SCORE + tiers.iter().map(|tier| tier.delta).sum::<f64>();
    let mut caps = Vec::new();

    if features.word_count < SHORT_RESPONSE_CAP_WORDS {
        total = total.clamp(5.0, 40.0);
        caps.push(SecondaryCap::ShortResponse);
    }
    // Also lifts anything below 10 back to 10, even after the short-response cap.
    if features.negative_score > NEGATIVE_CAP_SCORE {
        total = total.clamp(10.0, 50.0);
        caps.push(SecondaryCap::NegativeLanguage);
    }

    HeuristicOutcome {
        score: clamp_published(total),
        gate: None,
        tiers,
        caps,
    }
}

pub(crate) fn clamp_published(score: f64) -> f64 {
    score.clamp(SCORE_FLOOR, SCORE_CEILING)
}

fn content_quality(features: &FeatureRecord) -> TierDelta {
    let mut delta = 0.0;
    let mut notes = Vec::new();

    if features.positive_score > 5.0 {
        let reward = (features.positive_score * 0.3).min(10.0);
        delta += reward;
        notes.push(format!("positive language +{reward:.1}"));
    } else {
        delta -= 5.0;
        notes.push("little positive language -5".to_string());
    }

    if features.technical_score > 8.0 {
        let reward = (features.technical_score * 0.2).min(8.0);
        delta += reward;
        notes.push(format!("technical depth +{reward:.1}"));
    } else if features.technical_score < 3.0 {
        delta -= 8.0;
        notes.push("scarce technical content -8".to_string());
    }

    TierDelta {
        tier: ScoreTier::ContentQuality,
        delta,
        notes,
    }
}

fn communication(features: &FeatureRecord) -> TierDelta {
    let mut delta = 0.0;
    let mut notes = Vec::new();

    let words = features.word_count;
    if words < BRIEF_RESPONSE_WORDS {
        delta -= 15.0;
        notes.push(format!("very brief ({words} words) -15"));
    } else if words < SHORT_RESPONSE_WORDS {
        delta -= 8.0;
        notes.push(format!("brief ({words} words) -8"));
    } else if words <= GOOD_RESPONSE_MAX_WORDS {
        delta += 10.0;
        notes.push(format!("well-sized ({words} words) +10"));
    } else {
        delta += 3.0;
        notes.push(format!("verbose ({words} words) +3"));
    }

    let sentence_length = features.avg_response_length;
    if (10.0..=25.0).contains(&sentence_length) {
        delta += 5.0;
        notes.push("sentence length in ideal range +5".to_string());
    } else if sentence_length < 5.0 {
        delta -= 5.0;
        notes.push("fragmented sentences -5".to_string());
    }

    if features.specific_example_count > 0 {
        let reward = (features.specific_example_count as f64 * 3.0).min(6.0);
        delta += reward;
        notes.push(format!("specific examples +{reward:.0}"));
    }

    TierDelta {
        tier: ScoreTier::Communication,
        delta,
        notes,
    }
}

fn professionalism(features: &FeatureRecord) -> TierDelta {
    let mut delta = 5.0;
    let mut notes = vec!["baseline +5".to_string()];

    let penalty = (features.negative_score * 0.8).min(15.0);
    if penalty > 0.0 {
        delta -= penalty;
        notes.push(format!("hedging and filler -{penalty:.1}"));
    }

    if features.question_count > 0 {
        let bonus = (features.question_count as f64).min(2.0);
        delta += bonus;
        notes.push(format!("asked questions +{bonus:.0}"));
    }

    TierDelta {
        tier: ScoreTier::Professionalism,
        delta,
        notes,
    }
}

fn role_and_level(features: &FeatureRecord) -> TierDelta {
    let mut delta = 0.0;
    let mut notes = Vec::new();
    let technical = features.technical_score;

    match features.level_encoded {
        SENIOR_LEVEL => {
            if technical < 10.0 {
                delta -= 10.0;
                notes.push("senior answer lacks technical depth -10".to_string());
            } else if features.word_count < 150 {
                delta -= 8.0;
                notes.push("senior answer lacks detail -8".to_string());
            } else {
                delta += 3.0;
                notes.push("meets senior expectations +3".to_string());
            }
        }
        MID_LEVEL => {
            if technical < 5.0 {
                delta -= 5.0;
                notes.push("mid-level answer lacks technical depth -5".to_string());
            } else if features.word_count < SHORT_RESPONSE_WORDS {
                delta -= 3.0;
                notes.push("mid-level answer lacks detail -3".to_string());
            }
        }
        _ => {}
    }

    if is_engineering_title(&features.role) {
        if technical < 5.0 {
            delta -= 8.0;
            notes.push(format!("{} with little technical content -8", features.role));
        } else if technical > 12.0 {
            delta += 5.0;
            notes.push(format!("strong technical content for {} +5", features.role));
        }
    }

    TierDelta {
        tier: ScoreTier::RoleAndLevel,
        delta,
        notes,
    }
}

fn lexical_diversity(features: &FeatureRecord) -> TierDelta {
    let diversity = features.lexical_diversity;
    let (delta, note) = if diversity > 60.0 {
        (6.0, "excellent vocabulary +6")
    } else if diversity > 40.0 {
        (3.0, "good vocabulary +3")
    } else if diversity < 20.0 {
        (-5.0, "repetitive vocabulary -5")
    } else {
        (0.0, "average vocabulary")
    };

    TierDelta {
        tier: ScoreTier::LexicalDiversity,
        delta,
        notes: vec![note.to_string()],
    }
}
