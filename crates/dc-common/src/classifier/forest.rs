use serde::{Deserialize, Serialize};

use super::{BIN_COUNT, BucketClassifier, ClassifierError};

/// Tree node in flattened form; node 0 is the root.
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
        bin: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), ClassifierError> {
        if self.nodes.is_empty() {
            return Err(malformed("tree has no nodes"));
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
                        return Err(malformed(format!(
                            "node {idx} splits on feature {feature} of {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(malformed(format!("node {idx} has a non-finite threshold")));
                    }
                    // children must point forward, which also rules out cycles
                    if left <= idx || right <= idx || left >= self.nodes.len() || right >= self.nodes.len() {
                        return Err(malformed(format!("node {idx} has invalid children")));
                    }
                }
                TreeNode::Leaf { bin } => {
                    if bin as usize >= BIN_COUNT {
                        return Err(malformed(format!("leaf {idx} predicts bin {bin}")));
                    }
                }
            }
        }
        Ok(())
    }

    /// `x[feature] <= threshold` goes left.
    fn predict(&self, features: &[f64]) -> Result<u8, ClassifierError> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { bin }) => return Ok(*bin),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or(ClassifierError::FeatureCount {
                        expected: feature + 1,
                        actual: features.len(),
                    })?;
                    idx = if *value <= *threshold { *left } else { *right };
                }
                None => return Err(malformed(format!("node {idx} does not exist"))),
            }
        }
        Err(malformed("tree walk did not reach a leaf"))
    }
}

fn malformed(reason: impl Into<String>) -> ClassifierError {
    ClassifierError::Malformed {
        model: "forest",
        reason: reason.into(),
    }
}

/// Majority vote over decision trees. Ties go to the lower bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifier {
    pub trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    pub fn new(trees: Vec<DecisionTree>) -> Self {
        Self { trees }
    }
}

impl BucketClassifier for ForestClassifier {
    fn name(&self) -> &'static str {
        "forest"
    }

    fn validate(&self, n_features: usize) -> Result<(), ClassifierError> {
        if self.trees.is_empty() {
            return Err(malformed("forest has no trees"));
        }
        self.trees.iter().try_for_each(|tree| tree.validate(n_features))
    }

    fn predict(&self, features: &[f64]) -> Result<u8, ClassifierError> {
        let mut votes = [0usize; BIN_COUNT];
        for tree in &self.trees {
            let bin = tree.predict(features)? as usize;
            if let Some(count) = votes.get_mut(bin) {
                *count += 1;
            }
        }

        let mut best = 0;
        for (bin, count) in votes.iter().enumerate() {
            if *count > votes[best] {
                best = bin;
            }
        }
        Ok(best as u8)
    }
}
