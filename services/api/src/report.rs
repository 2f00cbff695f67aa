use crate::infra::{load_config, load_engine};
use chrono::Local;
use clap::{ArgGroup, Args};
use interview_scoring::error::AppError;
use interview_scoring::scoring::heuristic;
use interview_scoring::scoring::service::{model_info_view, ModelInfoView};
use interview_scoring::scoring::{
    RandomSource, ScoreRequest, ScoreResult, ScoringMethod, ScoringServiceError, DEFAULT_LEVEL,
    DEFAULT_ROLE,
};
use interview_scoring::telemetry;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("transcript").required(true).args(["file", "text"])))]
pub(crate) struct ScoreArgs {
    /// Read the transcript from a file
    #[arg(long)]
    pub(crate) file: Option<PathBuf>,
    /// Transcript passed inline
    #[arg(long)]
    pub(crate) text: Option<String>,
    /// Role the candidate interviewed for
    #[arg(long, default_value = DEFAULT_ROLE)]
    pub(crate) role: String,
    /// Seniority level the candidate interviewed for
    #[arg(long, default_value = DEFAULT_LEVEL)]
    pub(crate) level: String,
    /// Independent score (0-100) to classify agreement against
    #[arg(long)]
    pub(crate) external_score: Option<f64>,
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model_path: Option<PathBuf>,
    /// Seed the random jitter so repeated runs print identical scores
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Print the full result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ModelInfoArgs {
    /// Override the configured model artifact path
    #[arg(long)]
    pub(crate) model_path: Option<PathBuf>,
    /// Print the description as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct ScoreReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    result: &'a ScoreResult,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        file,
        text,
        role,
        level,
        external_score,
        model_path,
        seed,
        json,
    } = args;

    let config = load_config(model_path)?;
    telemetry::init(&config.telemetry, config.environment)?;

    if let Some(external) = external_score {
        if !(0.0..=100.0).contains(&external) {
            return Err(ScoringServiceError::InvalidExternalScore(external).into());
        }
    }

    let transcript = read_transcript(file, text)?;
    let engine = load_engine(&config);
    let random = seed.map_or(RandomSource::Entropy, RandomSource::Seeded);
    let request = ScoreRequest::new(transcript, role, level).detailed(external_score);
    let result = engine.score(&request, &mut random.rng());

    if json {
        let report = ScoreReport {
            generated_at: Local::now().to_rfc3339(),
            result: &result,
        };
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_score(&result, random));
    }

    Ok(())
}

pub(crate) fn run_model_info(args: ModelInfoArgs) -> Result<(), AppError> {
    let config = load_config(args.model_path)?;
    telemetry::init(&config.telemetry, config.environment)?;

    let engine = load_engine(&config);
    let artifact = engine
        .artifact()
        .ok_or(ScoringServiceError::ModelUnavailable)?;
    let view = model_info_view(&artifact.metadata, &artifact.feature_columns);

    if args.json {
        let rendered = serde_json::to_string_pretty(&view).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_model_info(&view, artifact.has_model()));
    }

    Ok(())
}

fn read_transcript(file: Option<PathBuf>, text: Option<String>) -> Result<String, AppError> {
    match (file, text) {
        (Some(path), _) => Ok(std::fs::read_to_string(path)?),
        (None, Some(text)) => Ok(text),
        (None, None) => Err(AppError::Scoring(ScoringServiceError::Transcript(
            interview_scoring::scoring::TranscriptError::Missing,
        ))),
    }
}

fn render_score(result: &ScoreResult, random: RandomSource) -> String {
    let mut out = String::new();
    let features = &result.features;

    let _ = writeln!(out, "Interview score: {:.2}", result.final_score);
    let _ = writeln!(out, "- method: {}", result.method.label());
    match result.blend.model_score {
        Some(model_score) if result.blend.model_trusted => {
            let _ = writeln!(
                out,
                "- model score: {model_score:.2} (adjustment {:+.1})",
                result.blend.adjustment
            );
        }
        Some(model_score) => {
            let _ = writeln!(
                out,
                "- model score: {model_score:.2} (outside plausible band, re-anchored)"
            );
        }
        None => {}
    }

    let _ = writeln!(out, "\nFeatures ({} / {})", features.role, features.level);
    let _ = writeln!(
        out,
        "- {} words | {:.1} words per sentence | {:.1}% lexical diversity",
        features.word_count, features.avg_response_length, features.lexical_diversity
    );
    let _ = writeln!(
        out,
        "- technical {} (score {:.1}) | positive {} (score {:.1}) | negative {} (score {:.1})",
        features.technical_term_count,
        features.technical_score,
        features.positive_keyword_count,
        features.positive_score,
        features.negative_indicator_count,
        features.negative_score
    );
    let _ = writeln!(
        out,
        "- {} questions asked | {} specific examples",
        features.question_count, features.specific_example_count
    );

    if result.method == ScoringMethod::Heuristic {
        // Tier deltas and caps are deterministic; only the gate name is shown, never its jitter.
        let audit = heuristic::evaluate(features, &mut random.rng());
        let _ = writeln!(out, "\nRule-based breakdown");
        if let Some(gate) = audit.gate {
            let _ = writeln!(out, "- gated: {gate:?}");
        }
        for tier in &audit.tiers {
            let _ = writeln!(
                out,
                "- {:?} {:+.1}: {}",
                tier.tier,
                tier.delta,
                tier.notes.join("; ")
            );
        }
        for cap in &audit.caps {
            let _ = writeln!(out, "- capped: {cap:?}");
        }
    }

    if let Some(categories) = &result.category_scores {
        let _ = writeln!(out, "\nCategories");
        for (name, category) in categories {
            let _ = writeln!(
                out,
                "- {name}: {:.2} (±{:.2})",
                category.model_score, category.variance
            );
        }
    }

    if let Some(agreement) = &result.agreement {
        let _ = writeln!(out, "\nAgreement: {} ({})", agreement.label, agreement.confidence);
        if let (Some(difference), Some(combined)) = (agreement.difference, agreement.combined_score)
        {
            let _ = writeln!(
                out,
                "- difference {difference:.1} points | combined score {combined:.0}"
            );
        }
    }

    out
}

fn render_model_info(view: &ModelInfoView, has_model: bool) -> String {
    let mut out = String::new();
    let info = &view.model_information;
    let metrics = &view.performance_metrics;

    let _ = writeln!(out, "{} ({})", info.name, info.model_type);
    if !has_model {
        let _ = writeln!(out, "- no trained predictor; scores come from the rule-based engine");
    }
    let _ = writeln!(
        out,
        "- trained {} on {} samples",
        info.training_date, info.training_samples
    );
    let _ = writeln!(
        out,
        "- R² {:.4} | RMSE {:.2} | MAE {:.2}",
        metrics.r2_score, metrics.rmse, metrics.mae
    );
    let _ = writeln!(out, "- {}", metrics.interpretation);
    let _ = writeln!(out, "Feature columns: {}", view.feature_columns.join(", "));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_scoring::scoring::model::LinearRegressor;
    use interview_scoring::scoring::{ModelArtifact, ScoringEngine};
    use std::sync::Arc;

    const ANSWER: &str = "I designed a rest api and deployed it to kubernetes. For example, \
I optimized the database indexes and improved latency. What does on-call look like here?";

    #[test]
    fn inline_text_is_used_when_no_file_given() {
        let text = read_transcript(None, Some("hello".to_string())).expect("inline text");
        assert_eq!(text, "hello");
        assert!(read_transcript(None, None).is_err());
    }

    #[test]
    fn missing_transcript_file_is_an_io_error() {
        let err = read_transcript(Some(PathBuf::from("/nonexistent/transcript.txt")), None)
            .expect_err("missing file");
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn rendered_score_lists_every_section() {
        let random = RandomSource::Seeded(4);
        let request = ScoreRequest::new(ANSWER, DEFAULT_ROLE, DEFAULT_LEVEL).detailed(Some(40.0));
        let result = ScoringEngine::without_artifact().score(&request, &mut random.rng());

        let rendered = render_score(&result, random);

        assert!(rendered.starts_with("Interview score: "));
        assert!(rendered.contains("Advanced Rule-Based"));
        assert!(rendered.contains("Rule-based breakdown"));
        assert!(rendered.contains("Technical Knowledge"));
        assert!(rendered.contains("Agreement: "));
    }

    #[test]
    fn model_scored_results_omit_rule_breakdown() {
        let random = RandomSource::Seeded(4);
        let mut artifact = ModelArtifact::fallback();
        artifact.model = Some(Box::new(LinearRegressor {
            intercept: 55.0,
            coefficients: vec![0.0; artifact.feature_columns.len()],
        }));
        let engine = ScoringEngine::new(Arc::new(artifact));
        let request = ScoreRequest::new(ANSWER, DEFAULT_ROLE, DEFAULT_LEVEL);
        let result = engine.score(&request, &mut random.rng());

        let rendered = render_score(&result, random);

        assert!(rendered.contains("Trained ML Model"));
        assert!(rendered.contains("- model score: 55.00"));
        assert!(!rendered.contains("Rule-based breakdown"));
    }

    #[test]
    fn rendered_model_info_flags_missing_predictor() {
        let artifact = ModelArtifact::fallback();
        let view = model_info_view(&artifact.metadata, &artifact.feature_columns);

        let rendered = render_model_info(&view, artifact.has_model());

        assert!(rendered.contains("no trained predictor"));
        assert!(rendered.contains("word_count"));
    }
}
