use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::info;

use super::{
    BucketClassifier, ClassifierEnsemble, ClassifierError, ForestClassifier,
    LinearBucketClassifier, StandardScaler,
};

pub const SCALER_FILE: &str = "feature_scaler.json";
pub const PRIMARY_FILE: &str = "primary_classifier.json";
pub const SECONDARY_FILE: &str = "secondary_classifier.json";
pub const METADATA_FILE: &str = "model_metadata.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifacts were fitted on {actual} features, engine extracts {expected}")]
    FeatureCount { expected: usize, actual: usize },
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub n_features: usize,
    #[serde(default = "unknown_version")]
    pub version: String,
    #[serde(default)]
    pub embedding_model_name: Option<String>,
}

fn unknown_version() -> String {
    "unknown".to_string()
}

/// Serialized classifier, tagged by model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Forest(ForestClassifier),
    Linear(LinearBucketClassifier),
}

impl ClassifierArtifact {
    pub fn into_classifier(self) -> Box<dyn BucketClassifier> {
        match self {
            ClassifierArtifact::Forest(model) => Box::new(model),
            ClassifierArtifact::Linear(model) => Box::new(model),
        }
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T, ArtifactError> {
    let path = dir.join(file);
    let raw = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Json { path, source })
}

/// Loads the scaler and both classifiers from `dir` and checks that they were
/// fitted on `expected_features` inputs.
pub fn load_ensemble(
    dir: &Path,
    expected_features: usize,
) -> Result<(ClassifierEnsemble, ModelMetadata), ArtifactError> {
    let metadata: ModelMetadata = read_json(dir, METADATA_FILE)?;
    if metadata.n_features != expected_features {
        return Err(ArtifactError::FeatureCount {
            expected: expected_features,
            actual: metadata.n_features,
        });
    }

    let scaler: StandardScaler = read_json(dir, SCALER_FILE)?;
    scaler.validate()?;
    if scaler.n_features() != expected_features {
        return Err(ArtifactError::FeatureCount {
            expected: expected_features,
            actual: scaler.n_features(),
        });
    }

    let primary: ClassifierArtifact = read_json(dir, PRIMARY_FILE)?;
    let secondary: ClassifierArtifact = read_json(dir, SECONDARY_FILE)?;
    let ensemble = ClassifierEnsemble::new(
        scaler,
        primary.into_classifier(),
        secondary.into_classifier(),
    )?;

    info!(
        model_dir = %dir.display(),
        version = %metadata.version,
        members = %ensemble.describe(),
        n_features = metadata.n_features,
        "loaded classifier ensemble"
    );

    Ok((ensemble, metadata))
}
