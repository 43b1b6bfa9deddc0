use serde::{Deserialize, Serialize};

use super::{BIN_COUNT, BucketClassifier, ClassifierError};

/// Multinomial linear model: one weight row and bias per bin, argmax wins.
/// Ties go to the lower bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearBucketClassifier {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl LinearBucketClassifier {
    pub fn new(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Self {
        Self { weights, bias }
    }

    fn malformed(reason: String) -> ClassifierError {
        ClassifierError::Malformed {
            model: "linear",
            reason,
        }
    }
}

impl BucketClassifier for LinearBucketClassifier {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn validate(&self, n_features: usize) -> Result<(), ClassifierError> {
        if self.weights.len() != BIN_COUNT || self.bias.len() != BIN_COUNT {
            return Err(Self::malformed(format!(
                "expected {BIN_COUNT} weight rows and biases, got {} and {}",
                self.weights.len(),
                self.bias.len()
            )));
        }
        if let Some((bin, row)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_features)
        {
            return Err(Self::malformed(format!(
                "row {bin} has {} weights for {n_features} features",
                row.len()
            )));
        }
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<u8, ClassifierError> {
        let mut best: Option<(usize, f64)> = None;
        for (bin, (row, bias)) in self.weights.iter().zip(self.bias.iter()).enumerate() {
            if row.len() != features.len() {
                return Err(ClassifierError::FeatureCount {
                    expected: row.len(),
                    actual: features.len(),
                });
            }
            let logit: f64 = row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + bias;
            match best {
                Some((_, top)) if logit <= top => {}
                _ => best = Some((bin, logit)),
            }
        }

        best.map(|(bin, _)| bin as u8)
            .ok_or_else(|| Self::malformed("model has no bins".into()))
    }
}
