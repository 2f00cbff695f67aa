use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::vocabulary::{
    encode_level, encode_role, occurrences, EXAMPLE_PHRASES, NEGATIVE_KEYWORDS,
    POSITIVE_KEYWORDS, TECHNICAL_VOCABULARIES,
};

const TECHNICAL_SCORE_CAP: f64 = 20.0;
const POSITIVE_SCORE_CAP: f64 = 15.0;
const NEGATIVE_SCORE_CAP: f64 = 20.0;

/// Fixed-shape summary of a transcript. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub word_count: u32,
    pub technical_term_count: u32,
    pub positive_keyword_count: u32,
    pub negative_indicator_count: u32,
    pub question_count: u32,
    pub specific_example_count: u32,
    /// Words per sentence.
    pub avg_response_length: f64,
    /// Unique tokens as a percentage of all tokens, in `[0, 100]`.
    pub lexical_diversity: f64,
    pub role: String,
    pub level: String,
    pub role_encoded: u8,
    pub level_encoded: u8,
    pub technical_score: f64,
    pub positive_score: f64,
    pub negative_score: f64,
}

impl FeatureRecord {
    /// Resolve a model input column by name.
    ///
    /// Artifacts trained against older extraction code name some columns differently
    /// (`technical_count`, `specific_examples`, ...); both spellings resolve to the same
    /// value. Unknown columns yield `None`.
    pub fn column(&self, name: &str) -> Option<f64> {
        let value = match name {
            "word_count" => self.word_count as f64,
            "technical_term_count" | "technical_count" => self.technical_term_count as f64,
            "positive_keyword_count" | "positive_count" => self.positive_keyword_count as f64,
            "negative_indicator_count" | "negative_count" => {
                self.negative_indicator_count as f64
            }
            "question_count" => self.question_count as f64,
            "specific_example_count" | "specific_examples" => self.specific_example_count as f64,
            "avg_response_length" => self.avg_response_length,
            "lexical_diversity" => self.lexical_diversity,
            "role_encoded" => self.role_encoded as f64,
            "level_encoded" => self.level_encoded as f64,
            "technical_score" => self.technical_score,
            "positive_score" => self.positive_score,
            "negative_score" => self.negative_score,
            _ => return None,
        };
        Some(value)
    }
}

/// Turn raw transcript text plus the target role and level into a [`FeatureRecord`].
///
/// Never fails: empty or malformed text produces an all-zero record and unknown labels
/// map to the fallback encodings.
pub fn extract(text: &str, role: &str, level: &str) -> FeatureRecord {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let word_count = words.len();

    let technical_term_count: usize = TECHNICAL_VOCABULARIES
        .iter()
        .flat_map(|terms| terms.iter())
        .map(|term| occurrences(&lowered, term))
        .sum();
    let positive_keyword_count: usize = POSITIVE_KEYWORDS
        .iter()
        .map(|keyword| occurrences(&lowered, keyword))
        .sum();
    let negative_indicator_count: usize = NEGATIVE_KEYWORDS
        .iter()
        .map(|keyword| occurrences(&lowered, keyword))
        .sum();

    let question_count = lowered.matches('?').count();

    let sentences = split_sentences(text);
    let specific_example_count = sentences
        .iter()
        .filter(|sentence| is_specific_example(sentence))
        .count();

    let avg_response_length = word_count as f64 / sentences.len().max(1) as f64;

    let lexical_diversity = if word_count == 0 {
        0.0
    } else {
        let unique: HashSet<&str> = words.iter().copied().collect();
        unique.len() as f64 / word_count as f64 * 100.0
    };

    FeatureRecord {
        word_count: word_count as u32,
        technical_term_count: technical_term_count as u32,
        positive_keyword_count: positive_keyword_count as u32,
        negative_indicator_count: negative_indicator_count as u32,
        question_count: question_count as u32,
        specific_example_count: specific_example_count as u32,
        avg_response_length,
        lexical_diversity,
        role: role.to_string(),
        level: level.to_string(),
        role_encoded: encode_role(role),
        level_encoded: encode_level(level),
        technical_score: (technical_term_count as f64 * 2.0).min(TECHNICAL_SCORE_CAP),
        positive_score: (positive_keyword_count as f64 * 1.5).min(POSITIVE_SCORE_CAP),
        negative_score: (negative_indicator_count as f64 * 2.0).min(NEGATIVE_SCORE_CAP),
    }
}

/// Split on runs of sentence terminators. Empty segments (for example after a trailing
/// full stop) are kept so the sentence count matches the tuned length thresholds.
fn split_sentences(text: &str) -> Vec<&str> {
    let is_terminator = |c: char| matches!(c, '.' | '!' | '?');
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut in_run = false;

    for (index, c) in text.char_indices() {
        if is_terminator(c) {
            if !in_run {
                sentences.push(&text[start..index]);
                in_run = true;
            }
        } else if in_run {
            start = index;
            in_run = false;
        }
    }
    if in_run {
        sentences.push("");
    } else {
        sentences.push(&text[start..]);
    }

    sentences
}

/// A sentence counts once whether it cites an example phrase, a number, or both.
fn is_specific_example(sentence: &str) -> bool {
    let lowered = sentence.to_lowercase();
    EXAMPLE_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
        || sentence.chars().any(|c| c.is_ascii_digit())
}
