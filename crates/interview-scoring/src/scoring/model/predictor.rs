use std::fmt;

use serde::{Deserialize, Serialize};

use super::PredictionError;

/// Trained regressor invoked on an already ordered and scaled input row.
pub trait Predictor: Send + Sync + fmt::Debug {
    fn predict(&self, input: &[f64]) -> Result<f64, PredictionError>;

    /// Human readable model family, used when the bundle metadata omits one.
    fn kind(&self) -> &'static str;

    /// Number of inputs the predictor was trained on.
    fn input_len(&self) -> usize;
}

/// Serialized predictor description as stored in an artifact bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictorSpec {
    Linear(LinearRegressor),
    GradientBoosting(GradientBoostedTrees),
}

impl PredictorSpec {
    pub fn into_predictor(self) -> Box<dyn Predictor> {
        match self {
            PredictorSpec::Linear(model) => Box::new(model),
            PredictorSpec::GradientBoosting(model) => Box::new(model),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl Predictor for LinearRegressor {
    fn predict(&self, input: &[f64]) -> Result<f64, PredictionError> {
        check_len(self.coefficients.len(), input.len())?;
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(input)
                .map(|(weight, value)| weight * value)
                .sum::<f64>())
    }

    fn kind(&self) -> &'static str {
        "Linear Regression"
    }

    fn input_len(&self) -> usize {
        self.coefficients.len()
    }
}

/// Additive ensemble of regression trees: `init + learning_rate * Σ tree(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub init: f64,
    pub learning_rate: f64,
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
}

/// Flattened tree; node 0 is the root and children are referenced by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionTree {
    fn evaluate(&self, input: &[f64]) -> Result<f64, PredictionError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in at most `nodes.len()` steps.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = input.get(*feature).ok_or_else(|| {
                        PredictionError::Predictor(format!(
                            "split references feature {feature} but input has {}",
                            input.len()
                        ))
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(PredictionError::Predictor(format!(
                        "tree node {index} does not exist"
                    )))
                }
            }
        }
        Err(PredictionError::Predictor(
            "tree traversal did not terminate".to_string(),
        ))
    }
}

impl Predictor for GradientBoostedTrees {
    fn predict(&self, input: &[f64]) -> Result<f64, PredictionError> {
        check_len(self.n_features, input.len())?;
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(input)?;
        }
        Ok(self.init + self.learning_rate * total)
    }

    fn kind(&self) -> &'static str {
        "Gradient Boosting Regressor"
    }

    fn input_len(&self) -> usize {
        self.n_features
    }
}

fn check_len(expected: usize, actual: usize) -> Result<(), PredictionError> {
    if expected == actual {
        Ok(())
    } else {
        Err(PredictionError::ColumnMismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_regressor_applies_weights() {
        let model = LinearRegressor {
            intercept: 10.0,
            coefficients: vec![0.5, 2.0],
        };
        assert_eq!(model.predict(&[4.0, 3.0]).expect("predicts"), 18.0);
        assert!(matches!(
            model.predict(&[1.0]),
            Err(PredictionError::ColumnMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn boosted_trees_sum_leaf_values() {
        let tree = RegressionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 100.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: -10.0 },
                TreeNode::Leaf { value: 20.0 },
            ],
        };
        let model = GradientBoostedTrees {
            init: 50.0,
            learning_rate: 0.5,
            n_features: 1,
            trees: vec![tree.clone(), tree],
        };
        assert_eq!(model.predict(&[40.0]).expect("predicts"), 40.0);
        assert_eq!(model.predict(&[250.0]).expect("predicts"), 70.0);
    }

    #[test]
    fn cyclic_tree_is_reported() {
        let model = GradientBoostedTrees {
            init: 0.0,
            learning_rate: 1.0,
            n_features: 1,
            trees: vec![RegressionTree {
                nodes: vec![TreeNode::Split {
                    feature: 0,
                    threshold: 1.0,
                    left: 0,
                    right: 0,
                }],
            }],
        };
        assert!(matches!(
            model.predict(&[0.0]),
            Err(PredictionError::Predictor(_))
        ));
    }

    #[test]
    fn spec_deserializes_tagged_predictors() {
        let spec: PredictorSpec = serde_json::from_str(
            r#"{"kind":"linear","intercept":1.0,"coefficients":[2.0]}"#,
        )
        .expect("valid spec");
        let predictor = spec.into_predictor();
        assert_eq!(predictor.kind(), "Linear Regression");
        assert_eq!(predictor.predict(&[3.0]).expect("predicts"), 7.0);
    }
}
