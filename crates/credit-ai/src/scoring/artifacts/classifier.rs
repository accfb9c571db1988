use super::super::schema::FeatureVector;
use serde::{Deserialize, Serialize};

/// `[P(class 0), P(class 1)]` for one row, in the classifier's native class order.
pub type ProbabilityRow = [f64; 2];

/// Opaque binary classifier exposing the two calls the scoring path needs.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Column names the model was fit against, in order.
    fn feature_names(&self) -> &[String];

    fn predict_proba(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<ProbabilityRow>, ClassifierError>;

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<u8>, ClassifierError> {
        Ok(self
            .predict_proba(rows)?
            .iter()
            .map(|probabilities| u8::from(probabilities[1] > 0.5))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("row {row}: model produced a non-finite margin")]
    NonFinite { row: usize },
    #[error("row {row}: feature index {feature} is outside the {width}-column input")]
    FeatureIndex {
        row: usize,
        feature: usize,
        width: usize,
    },
    #[error("row {row}: tree node {node} does not exist")]
    MissingNode { row: usize, node: usize },
    #[error("row {row}: tree walk did not reach a leaf within {limit} steps")]
    UnterminatedWalk { row: usize, limit: usize },
}

/// Serialized classifier, tagged by model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    GradientBoostedTrees(TreeEnsemble),
    LogisticRegression(LogisticModel),
}

impl ClassifierArtifact {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierArtifact::GradientBoostedTrees(model) => model.validate(),
            ClassifierArtifact::LogisticRegression(model) => model.validate(),
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn name(&self) -> &str {
        match self {
            ClassifierArtifact::GradientBoostedTrees(_) => "gradient_boosted_trees",
            ClassifierArtifact::LogisticRegression(_) => "logistic_regression",
        }
    }

    fn feature_names(&self) -> &[String] {
        match self {
            ClassifierArtifact::GradientBoostedTrees(model) => &model.feature_names,
            ClassifierArtifact::LogisticRegression(model) => &model.feature_names,
        }
    }

    fn predict_proba(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<ProbabilityRow>, ClassifierError> {
        rows.iter()
            .enumerate()
            .map(|(row, features)| {
                let margin = match self {
                    ClassifierArtifact::GradientBoostedTrees(model) => {
                        model.margin(row, features)?
                    }
                    ClassifierArtifact::LogisticRegression(model) => model.margin(features),
                };
                if !margin.is_finite() {
                    return Err(ClassifierError::NonFinite { row });
                }
                let positive = sigmoid(margin);
                Ok([1.0 - positive, positive])
            })
            .collect()
    }
}

/// Binary gradient-boosted ensemble; the positive-class probability is the sigmoid of the
/// summed leaf values plus `base_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// Nodes are stored in pre-order; a split sends `x <= threshold` to `left`.
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
        leaf: f64,
    },
}

impl TreeEnsemble {
    fn validate(&self) -> Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("feature_names is empty".to_string());
        }
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        if !self.base_score.is_finite() {
            return Err("base_score is not finite".to_string());
        }

        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .map_err(|detail| format!("tree {index}: {detail}"))?;
        }
        Ok(())
    }

    fn margin(&self, row: usize, features: &FeatureVector) -> Result<f64, ClassifierError> {
        self.trees.iter().try_fold(self.base_score, |sum, tree| {
            tree.leaf_value(row, features).map(|value| sum + value)
        })
    }
}

impl Tree {
    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(format!(
                            "node {index} splits on feature {feature} but the model has {width} features"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {index} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!(
                                "node {index} points at child {child}, expected an index in {}..{}",
                                index + 1,
                                self.nodes.len()
                            ));
                        }
                    }
                }
                TreeNode::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(format!("node {index} has a non-finite leaf value"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walks from the root to a leaf. Any path visits each node at most once, so a walk
    /// longer than the node count is a cycle.
    fn leaf_value(&self, row: usize, features: &FeatureVector) -> Result<f64, ClassifierError> {
        let limit = self.nodes.len();
        let mut index = 0;
        for _ in 0..limit.max(1) {
            let node = self
                .nodes
                .get(index)
                .ok_or(ClassifierError::MissingNode { row, node: index })?;
            match node {
                TreeNode::Leaf { leaf } => return Ok(*leaf),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).ok_or(ClassifierError::FeatureIndex {
                        row,
                        feature: *feature,
                        width: features.len(),
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
            }
        }
        Err(ClassifierError::UnterminatedWalk { row, limit })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    fn validate(&self) -> Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("feature_names is empty".to_string());
        }
        if self.coefficients.len() != self.feature_names.len() {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("coefficients must be finite".to_string());
        }
        Ok(())
    }

    fn margin(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.iter())
                .map(|(weight, value)| weight * value)
                .sum::<f64>()
    }
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::schema::{FEATURE_COLUMNS, FEATURE_COUNT};

    fn names() -> Vec<String> {
        FEATURE_COLUMNS.iter().map(|name| name.to_string()).collect()
    }

    fn stump(feature: usize, threshold: f64, below: f64, above: f64) -> Tree {
        Tree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { leaf: below },
                TreeNode::Leaf { leaf: above },
            ],
        }
    }

    #[test]
    fn ensemble_sums_leaves_through_sigmoid() {
        let model = ClassifierArtifact::GradientBoostedTrees(TreeEnsemble {
            feature_names: names(),
            base_score: 0.0,
            trees: vec![stump(4, 650.0, -2.0, 2.0), stump(9, 4.0, 0.5, -1.5)],
        });
        let mut row = [0.0; FEATURE_COUNT];
        row[4] = 750.0;
        row[9] = 0.4;

        let probabilities = model.predict_proba(&[row]).expect("scores");
        let expected = 1.0 / (1.0 + (-2.5f64).exp());
        assert!((probabilities[0][1] - expected).abs() < 1e-12);
        assert!((probabilities[0][0] + probabilities[0][1] - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&[row]).expect("labels"), vec![1]);
    }

    #[test]
    fn split_threshold_is_inclusive_on_the_left() {
        let tree = stump(0, 1.0, -1.0, 1.0);
        let mut row = [0.0; FEATURE_COUNT];
        row[0] = 1.0;
        assert_eq!(tree.leaf_value(0, &row), Ok(-1.0));
    }

    #[test]
    fn self_looping_split_stops_with_an_error() {
        let tree = Tree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 0,
            }],
        };
        let row = [0.0; FEATURE_COUNT];
        assert_eq!(
            tree.leaf_value(3, &row),
            Err(ClassifierError::UnterminatedWalk { row: 3, limit: 1 })
        );
    }

    #[test]
    fn dangling_child_is_reported() {
        let mut tree = stump(0, 1.0, -1.0, 1.0);
        tree.nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 7,
            right: 2,
        };
        let row = [0.0; FEATURE_COUNT];
        assert_eq!(
            tree.leaf_value(0, &row),
            Err(ClassifierError::MissingNode { row: 0, node: 7 })
        );
    }

    #[test]
    fn logistic_model_rejects_coefficient_mismatch() {
        let model = LogisticModel {
            feature_names: names(),
            coefficients: vec![0.1; 3],
            intercept: 0.0,
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn artifact_deserializes_tagged_json() {
        let json = r#"{
            "kind": "logistic_regression",
            "feature_names": ["a", "b"],
            "coefficients": [1.0, -1.0],
            "intercept": 0.25
        }"#;
        let artifact: ClassifierArtifact = serde_json::from_str(json).expect("parses");
        assert_eq!(artifact.name(), "logistic_regression");
        assert_eq!(artifact.feature_names().len(), 2);
    }
}
