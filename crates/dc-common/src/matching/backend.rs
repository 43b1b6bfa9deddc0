use tracing::warn;

use super::features::FeatureVector;
use crate::classifier::{ClassifierEnsemble, EnsembleBins};
use crate::embedding::TextEmbedder;

/// Optional enrichment available to the engine.
///
/// - `ComponentOnlyBackend`: always available, no embeddings, no ensemble
/// - `ArtifactBackend`: whatever artifacts loaded at construction
///
/// Backends are fixed once the engine is built and are read-only afterwards.
pub trait ScoringBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Embedder for the similarity features, if one is configured.
    fn embedder(&self) -> Option<&dyn TextEmbedder>;

    /// Ensemble bins for a feature vector. `None` means "use the weighted
    /// score alone", including when inference fails for this call.
    fn predict_bins(&self, features: &FeatureVector) -> Option<EnsembleBins>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentOnlyBackend;

impl ScoringBackend for ComponentOnlyBackend {
    fn name(&self) -> &'static str {
        "component_only"
    }

    fn embedder(&self) -> Option<&dyn TextEmbedder> {
        None
    }

    fn predict_bins(&self, _features: &FeatureVector) -> Option<EnsembleBins> {
        None
    }
}

pub struct ArtifactBackend {
    embedder: Option<Box<dyn TextEmbedder>>,
    ensemble: Option<ClassifierEnsemble>,
}

impl ArtifactBackend {
    pub fn new(
        embedder: Option<Box<dyn TextEmbedder>>,
        ensemble: Option<ClassifierEnsemble>,
    ) -> Self {
        Self { embedder, ensemble }
    }
}

impl ScoringBackend for ArtifactBackend {
    fn name(&self) -> &'static str {
        match (self.embedder.is_some(), self.ensemble.is_some()) {
            (true, true) => "embedding+ensemble",
            (true, false) => "embedding",
            (false, true) => "ensemble",
            (false, false) => "component_only",
        }
    }

    fn embedder(&self) -> Option<&dyn TextEmbedder> {
        self.embedder.as_deref()
    }

    fn predict_bins(&self, features: &FeatureVector) -> Option<EnsembleBins> {
        let ensemble = self.ensemble.as_ref()?;
        match ensemble.predict_bins(&features.to_array()) {
            Ok(bins) => Some(bins),
            Err(err) => {
                warn!(error = %err, "ensemble prediction failed; using weighted score");
                None
            }
        }
    }
}
