use serde::{Deserialize, Serialize};

/// How closely two independently produced scores match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgreementLevel {
    MlOnly,
    StrongAgreement,
    GoodAgreement,
    ModerateAgreement,
    Divergent,
}

impl AgreementLevel {
    pub fn label(self) -> &'static str {
        match self {
            AgreementLevel::MlOnly => "ML Only",
            AgreementLevel::StrongAgreement => "Strong Agreement",
            AgreementLevel::GoodAgreement => "Good Agreement",
            AgreementLevel::ModerateAgreement => "Moderate Agreement",
            AgreementLevel::Divergent => "Divergent Scores",
        }
    }

    pub fn confidence(self) -> &'static str {
        match self {
            AgreementLevel::MlOnly => "Single validation mode",
            AgreementLevel::StrongAgreement => "High confidence",
            AgreementLevel::GoodAgreement => "Good confidence",
            AgreementLevel::ModerateAgreement => "Moderate confidence",
            AgreementLevel::Divergent => "Low confidence - human review recommended",
        }
    }
}

/// Thresholds are inclusive and checked in ascending order.
pub fn classify_agreement(score_a: Option<f64>, score_b: f64) -> AgreementLevel {
    let Some(score_a) = score_a else {
        return AgreementLevel::MlOnly;
    };

    let difference = (score_a - score_b).abs();
    if difference <= 5.0 {
        AgreementLevel::StrongAgreement
    } else if difference <= 10.0 {
        AgreementLevel::GoodAgreement
    } else if difference <= 15.0 {
        AgreementLevel::ModerateAgreement
    } else {
        AgreementLevel::Divergent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementReport {
    pub level: AgreementLevel,
    pub label: String,
    pub confidence: String,
    /// Absolute point difference, one decimal place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
    /// Rounded mean of both scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<f64>,
}

impl AgreementReport {
    pub fn compare(external_score: Option<f64>, engine_score: f64) -> Self {
        let level = classify_agreement(external_score, engine_score);
        let difference =
            external_score.map(|external| ((external - engine_score).abs() * 10.0).round() / 10.0);
        let combined_score = external_score.map(|external| ((external + engine_score) / 2.0).round());

        Self {
            level,
            label: level.label().to_string(),
            confidence: level.confidence().to_string(),
            difference,
            combined_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_documented_examples() {
        assert_eq!(classify_agreement(Some(10.0), 12.0), AgreementLevel::StrongAgreement);
        // An 11 point gap sits inside the inclusive 15 point moderate band.
        assert_eq!(classify_agreement(Some(10.0), 21.0), AgreementLevel::ModerateAgreement);
        assert_eq!(classify_agreement(Some(10.0), 26.0), AgreementLevel::Divergent);
        assert_eq!(classify_agreement(None, 50.0), AgreementLevel::MlOnly);
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(classify_agreement(Some(50.0), 55.0), AgreementLevel::StrongAgreement);
        assert_eq!(classify_agreement(Some(50.0), 60.0), AgreementLevel::GoodAgreement);
        assert_eq!(classify_agreement(Some(65.0), 50.0), AgreementLevel::ModerateAgreement);
        assert_eq!(classify_agreement(Some(50.0), 65.5), AgreementLevel::Divergent);
    }

    #[test]
    fn report_carries_difference_and_average() {
        let report = AgreementReport::compare(Some(72.0), 64.25);
        assert_eq!(report.level, AgreementLevel::GoodAgreement);
        assert_eq!(report.label, "Good Agreement");
        assert_eq!(report.difference, Some(7.8));
        assert_eq!(report.combined_score, Some(68.0));

        let solo = AgreementReport::compare(None, 64.25);
        assert_eq!(solo.level, AgreementLevel::MlOnly);
        assert!(solo.difference.is_none());
        assert!(solo.combined_score.is_none());
    }
}
