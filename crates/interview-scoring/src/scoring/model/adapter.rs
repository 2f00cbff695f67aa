use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use super::{ModelArtifact, PredictionError};
use crate::scoring::features::FeatureRecord;

/// Raw model score clamped to `[0, 100]`, or `None` when the caller must fall back to
/// the rule-based scorer: no predictor in the artifact, or prediction failed.
pub fn predict(artifact: &ModelArtifact, features: &FeatureRecord) -> Option<f64> {
    match try_predict(artifact, features) {
        Ok(score) => score,
        Err(err) => {
            warn!(error = %err, "model prediction failed; deferring to rule-based scoring");
            None
        }
    }
}

/// Same as [`predict`] but surfaces the failure instead of logging it.
pub fn try_predict(
    artifact: &ModelArtifact,
    features: &FeatureRecord,
) -> Result<Option<f64>, PredictionError> {
    let Some(model) = artifact.model.as_deref() else {
        return Ok(None);
    };

    let row = input_row(artifact, features);
    let row = match &artifact.scaler {
        Some(scaler) => scaler.transform(&row)?,
        None => row,
    };

    let raw = panic::catch_unwind(AssertUnwindSafe(|| model.predict(&row)))
        .map_err(|payload| PredictionError::Predictor(panic_message(payload.as_ref())))??;
    if !raw.is_finite() {
        return Err(PredictionError::NonFinite);
    }

    Ok(Some(raw.clamp(0.0, 100.0)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("predictor panicked: {detail}")
}

/// Columns in artifact order; anything the record cannot supply becomes 0.
fn input_row(artifact: &ModelArtifact, features: &FeatureRecord) -> Vec<f64> {
    artifact
        .feature_columns
        .iter()
        .map(|column| {
            let encoded = artifact.encoders.as_ref().and_then(|encoders| {
                match column.as_str() {
                    "role_encoded" => encoders.encode_role(&features.role),
                    "level_encoded" => encoders.encode_level(&features.level),
                    _ => None,
                }
            });
            match encoded {
                Some(index) => index as f64,
                None => features.column(column).unwrap_or(0.0),
            }
        })
        .collect()
}
