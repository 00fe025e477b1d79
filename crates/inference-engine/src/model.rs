//! Scoring Models

use crate::InferenceError;
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// A model mapping feature rows to failure probabilities
pub trait ScoringModel: Send + Sync + std::fmt::Debug {
    /// Short model family name for logs and health output
    fn kind(&self) -> &'static str;

    /// Number of input columns the model expects
    fn n_features(&self) -> usize;

    /// Probability of the failure class for each row, in [0, 1]
    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Vec<f64>;
}

/// Serialized model description inside an artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelSpec {
    /// Logistic regression: `sigmoid(intercept + w . x)`
    Logistic { weights: Vec<f64>, intercept: f64 },
    /// Tree ensemble averaging leaf probabilities
    Forest { trees: Vec<Tree> },
}

impl ModelSpec {
    /// Validate against the input width and build the runnable model
    pub fn build(self, n_features: usize) -> Result<Box<dyn ScoringModel>, InferenceError> {
        match self {
            ModelSpec::Logistic { weights, intercept } => {
                Ok(Box::new(LogisticModel::new(weights, intercept, n_features)?))
            }
            ModelSpec::Forest { trees } => Ok(Box::new(ForestModel::new(trees, n_features)?)),
        }
    }
}

/// Logistic regression over the contract's columns
#[derive(Debug, Clone)]
pub struct LogisticModel {
    weights: Array1<f64>,
    intercept: f64,
}

impl LogisticModel {
    pub fn new(weights: Vec<f64>, intercept: f64, n_features: usize) -> Result<Self, InferenceError> {
        if weights.len() != n_features {
            return Err(InferenceError::InvalidModel(format!(
                "logistic model has {} weights, contract has {} features",
                weights.len(),
                n_features
            )));
        }
        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(InferenceError::InvalidModel(
                "logistic coefficients must be finite".to_string(),
            ));
        }
        Ok(Self {
            weights: Array1::from(weights),
            intercept,
        })
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ScoringModel for LogisticModel {
    fn kind(&self) -> &'static str {
        "logistic"
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Vec<f64> {
        rows.dot(&self.weights)
            .iter()
            .map(|&z| sigmoid(z + self.intercept))
            .collect()
    }
}

/// One node of an exported decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNode {
    /// Go `left` when `x[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { probability: f64 },
}

/// Decision tree in pre-order: node 0 is the root, children follow parents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, tree_idx: usize, n_features: usize) -> Result<(), InferenceError> {
        let invalid = |msg: String| InferenceError::InvalidModel(format!("tree {tree_idx}: {msg}"));

        if self.nodes.is_empty() {
            return Err(invalid("no nodes".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(invalid(format!(
                            "node {idx} splits on feature {feature}, only {n_features} exist"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("node {idx} has a non-finite threshold")));
                    }
                    // Children after their parent rules out cycles
                    for child in [left, right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(invalid(format!("node {idx} has invalid child {child}")));
                        }
                    }
                }
                TreeNode::Leaf { probability } => {
                    if !(0.0..=1.0).contains(&probability) {
                        return Err(invalid(format!(
                            "node {idx} leaf probability {probability} outside [0, 1]"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { probability }) => return *probability,
                // Unreachable after validation
                None => return 0.0,
            }
        }
    }
}

/// Ensemble of decision trees; probability is the mean over trees
#[derive(Debug, Clone)]
pub struct ForestModel {
    trees: Vec<Tree>,
    n_features: usize,
}

impl ForestModel {
    pub fn new(trees: Vec<Tree>, n_features: usize) -> Result<Self, InferenceError> {
        if trees.is_empty() {
            return Err(InferenceError::InvalidModel("forest has no trees".to_string()));
        }
        for (idx, tree) in trees.iter().enumerate() {
            tree.validate(idx, n_features)?;
        }
        Ok(Self { trees, n_features })
    }
}

impl ScoringModel for ForestModel {
    fn kind(&self) -> &'static str {
        "forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Vec<f64> {
        let n_trees = self.trees.len() as f64;
        rows.rows()
            .into_iter()
            .map(|row| self.trees.iter().map(|t| t.evaluate(row)).sum::<f64>() / n_trees)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> Tree {
        Tree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { probability: low },
                TreeNode::Leaf { probability: high },
            ],
        }
    }

    #[test]
    fn test_logistic_probabilities() {
        let model = LogisticModel::new(vec![1.0, -1.0], 0.0, 2).unwrap();
        let probs = model.predict_proba(array![[0.0, 0.0], [2.0, 0.0]].view());
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!((probs[1] - sigmoid(2.0)).abs() < 1e-12);
        assert!(probs[1] > 0.5);
    }

    #[test]
    fn test_logistic_width_checked() {
        let err = LogisticModel::new(vec![1.0; 3], 0.0, 42).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidModel(_)));
    }

    #[test]
    fn test_forest_averages_trees() {
        let forest = ForestModel::new(vec![stump(0, 5.0, 0.0, 1.0), stump(1, 5.0, 0.2, 0.6)], 2).unwrap();
        let probs = forest.predict_proba(array![[1.0, 1.0], [9.0, 9.0], [9.0, 1.0]].view());
        assert!((probs[0] - 0.1).abs() < 1e-12);
        assert!((probs[1] - 0.8).abs() < 1e-12);
        assert!((probs[2] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_forest_split_on_threshold_goes_left() {
        let forest = ForestModel::new(vec![stump(0, 5.0, 0.0, 1.0)], 1).unwrap();
        assert_eq!(forest.predict_proba(array![[5.0]].view()), vec![0.0]);
    }

    #[test]
    fn test_forest_validation() {
        let cyclic = Tree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(ForestModel::new(vec![cyclic], 1).is_err());
        assert!(ForestModel::new(vec![stump(3, 1.0, 0.0, 1.0)], 2).is_err());
        assert!(ForestModel::new(vec![stump(0, 1.0, 0.0, 1.5)], 1).is_err());
        assert!(ForestModel::new(Vec::new(), 1).is_err());
    }

    #[test]
    fn test_forest_json_layout() {
        let json = r#"{"kind":"forest","trees":[{"nodes":[
            {"split":{"feature":0,"threshold":0.5,"left":1,"right":2}},
            {"leaf":{"probability":0.1}},
            {"leaf":{"probability":0.9}}]}]}"#;
        let spec: ModelSpec = serde_json::from_str(json).unwrap();
        let model = spec.build(1).unwrap();
        assert_eq!(model.kind(), "forest");
        assert_eq!(model.predict_proba(array![[1.0]].view()), vec![0.9]);
    }
}
