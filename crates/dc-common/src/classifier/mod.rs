pub mod artifacts;
pub mod forest;
pub mod linear;
pub mod scaler;

pub use artifacts::{ArtifactError, ModelMetadata, load_ensemble};
pub use forest::ForestClassifier;
pub use linear::LinearBucketClassifier;
pub use scaler::StandardScaler;

/// Number of ordinal match-quality bins a bucket classifier predicts into.
pub const BIN_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("malformed {model} model: {reason}")]
    Malformed { model: &'static str, reason: String },
}

/// Maps a (scaled) feature vector to one of `BIN_COUNT` ordinal bins.
pub trait BucketClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Checks the model shape against the feature width it will be fed.
    fn validate(&self, n_features: usize) -> Result<(), ClassifierError>;

    fn predict(&self, features: &[f64]) -> Result<u8, ClassifierError>;
}

/// Bins predicted by both ensemble members for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleBins {
    pub primary: u8,
    pub secondary: u8,
}

/// A fitted scaler plus two independent bucket classifiers.
pub struct ClassifierEnsemble {
    scaler: StandardScaler,
    primary: Box<dyn BucketClassifier>,
    secondary: Box<dyn BucketClassifier>,
}

impl ClassifierEnsemble {
    pub fn new(
        scaler: StandardScaler,
        primary: Box<dyn BucketClassifier>,
        secondary: Box<dyn BucketClassifier>,
    ) -> Result<Self, ClassifierError> {
        let n_features = scaler.n_features();
        primary.validate(n_features)?;
        secondary.validate(n_features)?;
        Ok(Self {
            scaler,
            primary,
            secondary,
        })
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    pub fn describe(&self) -> String {
        format!("{}+{}", self.primary.name(), self.secondary.name())
    }

    pub fn predict_bins(&self, features: &[f64]) -> Result<EnsembleBins, ClassifierError> {
        let scaled = self.scaler.transform(features)?;
        Ok(EnsembleBins {
            primary: self.primary.predict(&scaled)?,
            secondary: self.secondary.predict(&scaled)?,
        })
    }
}

impl std::fmt::Debug for ClassifierEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierEnsemble")
            .field("n_features", &self.n_features())
            .field("members", &self.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBin(u8);

    impl BucketClassifier for FixedBin {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn validate(&self, _n_features: usize) -> Result<(), ClassifierError> {
            Ok(())
        }

        fn predict(&self, _features: &[f64]) -> Result<u8, ClassifierError> {
            Ok(self.0)
        }
    }

    fn identity_scaler(n: usize) -> StandardScaler {
        StandardScaler::new(vec![0.0; n], vec![1.0; n]).unwrap()
    }

    #[test]
    fn predicts_bins_from_both_members() {
        let ensemble =
            ClassifierEnsemble::new(identity_scaler(2), Box::new(FixedBin(3)), Box::new(FixedBin(1)))
                .unwrap();

        let bins = ensemble.predict_bins(&[0.2, 0.4]).unwrap();

        assert_eq!(bins, EnsembleBins { primary: 3, secondary: 1 });
        assert_eq!(ensemble.describe(), "fixed+fixed");
    }

    #[test]
    fn scaler_width_mismatch_fails_prediction() {
        let ensemble =
            ClassifierEnsemble::new(identity_scaler(3), Box::new(FixedBin(0)), Box::new(FixedBin(0)))
                .unwrap();

        let err = ensemble.predict_bins(&[0.1]).unwrap_err();

        assert_eq!(err, ClassifierError::FeatureCount { expected: 3, actual: 1 });
    }

    #[test]
    fn rejects_members_that_do_not_fit_the_scaler() {
        let linear = LinearBucketClassifier::new(vec![vec![0.0; 5]; BIN_COUNT], vec![0.0; BIN_COUNT]);

        let result = ClassifierEnsemble::new(identity_scaler(2), Box::new(linear), Box::new(FixedBin(0)));

        assert!(matches!(result, Err(ClassifierError::Malformed { .. })));
    }
}
