use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InferenceError};
use crate::inference::Classifier;

/// A persisted classifier, tagged by `kind` in its JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    DecisionTree(DecisionTree),
    Logistic(LogisticModel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub root: TreeNode,
}

/// Samples with `x[feature] <= threshold` follow `left`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        class: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub n_features: usize,
    pub weights: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

pub fn load_model(path: &Path) -> Result<ModelArtifact, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ModelUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ModelArtifact =
        serde_json::from_str(&text).map_err(|source| ConfigError::ModelCorrupt {
            path: path.to_path_buf(),
            source,
        })?;
    artifact.validate()?;
    Ok(artifact)
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::DecisionTree(_) => "decision_tree",
            ModelArtifact::Logistic(_) => "logistic",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            ModelArtifact::DecisionTree(tree) => tree.n_features,
            ModelArtifact::Logistic(model) => model.n_features,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_features() == 0 {
            return Err(ConfigError::ModelInvalid(
                "n_features must be positive".to_string(),
            ));
        }

        match self {
            ModelArtifact::DecisionTree(tree) => validate_node(&tree.root, tree.n_features),
            ModelArtifact::Logistic(model) => {
                if model.weights.len() != model.n_features {
                    return Err(ConfigError::ModelInvalid(format!(
                        "logistic model has {} weights for {} features",
                        model.weights.len(),
                        model.n_features
                    )));
                }
                if !model.weights.iter().all(|weight| weight.is_finite())
                    || !model.intercept.is_finite()
                {
                    return Err(ConfigError::ModelInvalid(
                        "logistic coefficients must be finite".to_string(),
                    ));
                }
                if !(model.threshold > 0.0 && model.threshold < 1.0) {
                    return Err(ConfigError::ModelInvalid(format!(
                        "decision threshold {} is outside (0, 1)",
                        model.threshold
                    )));
                }
                Ok(())
            }
        }
    }
}

fn validate_node(node: &TreeNode, n_features: usize) -> Result<(), ConfigError> {
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(ConfigError::ModelInvalid(format!(
                        "split on feature {feature} but the model has {n_features} features"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ConfigError::ModelInvalid(format!(
                        "split on feature {feature} has a non-finite threshold"
                    )));
                }
                stack.push(left);
                stack.push(right);
            }
            TreeNode::Leaf { class } if *class > 1 => {
                return Err(ConfigError::ModelInvalid(format!(
                    "leaf predicts class {class}, expected 0 or 1"
                )));
            }
            TreeNode::Leaf { .. } => {}
        }
    }
    Ok(())
}

fn check_shape(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}

impl Classifier for DecisionTree {
    fn predict(&self, features: &[f64]) -> Result<u8, InferenceError> {
        check_shape(self.n_features, features)?;

        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().ok_or_else(|| {
                        InferenceError::Model(format!("feature {feature} is out of bounds"))
                    })?;
                    node = if value <= *threshold { &**left } else { &**right };
                }
                TreeNode::Leaf { class } => return Ok(*class),
            }
        }
    }
}

impl LogisticModel {
    pub fn probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_shape(self.n_features, features)?;

        let margin: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept;
        let probability = 1.0 / (1.0 + (-margin).exp());
        if probability.is_nan() {
            return Err(InferenceError::Model(
                "logistic score is not a number".to_string(),
            ));
        }
        Ok(probability)
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, features: &[f64]) -> Result<u8, InferenceError> {
        let probability = self.probability(features)?;
        Ok(u8::from(probability >= self.threshold))
    }
}

impl Classifier for ModelArtifact {
    fn predict(&self, features: &[f64]) -> Result<u8, InferenceError> {
        match self {
            ModelArtifact::DecisionTree(tree) => tree.predict(features),
            ModelArtifact::Logistic(model) => model.predict(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FEATURE_COUNT;

    const CONTRACT_TREE: &str = r#"{
        "kind": "decision_tree",
        "n_features": 20,
        "root": {
            "node": "split", "feature": 14, "threshold": 0.5,
            "left": {
                "node": "split", "feature": 4, "threshold": 24.0,
                "left": { "node": "leaf", "class": 1 },
                "right": { "node": "leaf", "class": 0 }
            },
            "right": { "node": "leaf", "class": 0 }
        }
    }"#;

    fn features(contract: f64, tenure: f64) -> Vec<f64> {
        let mut values = vec![0.0; FEATURE_COUNT];
        values[4] = tenure;
        values[14] = contract;
        values
    }

    fn parse(json: &str) -> ModelArtifact {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn tree_walks_splits() {
        let model = parse(CONTRACT_TREE);
        model.validate().unwrap();
        assert_eq!(model.kind(), "decision_tree");
        assert_eq!(model.predict(&features(0.0, 12.0)), Ok(1));
        assert_eq!(model.predict(&features(0.0, 48.0)), Ok(0));
        assert_eq!(model.predict(&features(2.0, 3.0)), Ok(0));
    }

    #[test]
    fn threshold_boundary_goes_left() {
        let model = parse(CONTRACT_TREE);
        assert_eq!(model.predict(&features(0.0, 24.0)), Ok(1));
    }

    #[test]
    fn rejects_wrong_vector_length() {
        let model = parse(CONTRACT_TREE);
        assert_eq!(
            model.predict(&[0.0; 19]),
            Err(InferenceError::ShapeMismatch {
                expected: 20,
                actual: 19
            })
        );
    }

    #[test]
    fn logistic_applies_threshold() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[14] = -2.0;
        let model = ModelArtifact::Logistic(LogisticModel {
            n_features: FEATURE_COUNT,
            weights,
            intercept: 1.0,
            threshold: 0.5,
        });
        model.validate().unwrap();
        assert_eq!(model.predict(&features(0.0, 0.0)), Ok(1));
        assert_eq!(model.predict(&features(2.0, 0.0)), Ok(0));
    }

    #[test]
    fn logistic_threshold_defaults_to_half() {
        let model =
            parse(r#"{"kind": "logistic", "n_features": 2, "weights": [1.0, -1.0], "intercept": 0.0}"#);
        match &model {
            ModelArtifact::Logistic(inner) => assert_eq!(inner.threshold, 0.5),
            other => panic!("unexpected model {other:?}"),
        }
        assert_eq!(model.predict(&[1.0, 1.0]), Ok(1));
        assert_eq!(model.predict(&[0.0, 1.0]), Ok(0));
    }

    #[test]
    fn validation_catches_bad_artifacts() {
        let out_of_range = parse(
            r#"{"kind": "decision_tree", "n_features": 20,
                "root": {"node": "split", "feature": 20, "threshold": 1.0,
                         "left": {"node": "leaf", "class": 0},
                         "right": {"node": "leaf", "class": 1}}}"#,
        );
        assert!(matches!(
            out_of_range.validate(),
            Err(ConfigError::ModelInvalid(_))
        ));

        let bad_leaf = parse(
            r#"{"kind": "decision_tree", "n_features": 20, "root": {"node": "leaf", "class": 2}}"#,
        );
        assert!(bad_leaf.validate().is_err());

        let short_weights = parse(
            r#"{"kind": "logistic", "n_features": 20, "weights": [1.0], "intercept": 0.0}"#,
        );
        assert!(short_weights.validate().is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_model(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ModelUnreadable { .. }));
    }

    #[test]
    fn demo_model_loads_from_disk() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/churn_model.json");
        let model = load_model(&path).unwrap();
        let mut fiber_newcomer = features(0.0, 12.0);
        fiber_newcomer[7] = 1.0;
        assert_eq!(model.predict(&fiber_newcomer), Ok(1));
        assert_eq!(model.predict(&features(1.0, 12.0)), Ok(0));
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let result: Result<ModelArtifact, _> =
            serde_json::from_str(r#"{"kind": "svm", "n_features": 20}"#);
        assert!(result.is_err());
    }
}
