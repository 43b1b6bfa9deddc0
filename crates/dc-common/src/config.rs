use std::path::PathBuf;

use crate::embedding::DEFAULT_EMBEDDING_DIMENSION;
use crate::matching::DEFAULT_TOP_N;

/// Engine settings, normally read from `DC_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Classifier artifact bundle; `None` disables the ensemble.
    pub model_dir: Option<PathBuf>,
    /// `hash` or `none`.
    pub embedder: String,
    pub embedding_dimension: usize,
    pub default_top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            embedder: "none".into(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparseable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            model_dir: non_empty("DC_MODEL_DIR").map(PathBuf::from),
            embedder: non_empty("DC_EMBEDDER")
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or(defaults.embedder),
            embedding_dimension: non_empty("DC_EMBEDDING_DIMENSION")
                .and_then(|s| s.parse().ok())
                .filter(|&d: &usize| d > 0)
                .unwrap_or(defaults.embedding_dimension),
            default_top_n: non_empty("DC_RANK_TOP_N")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_top_n),
        }
    }
}
