pub mod hash_embedder;
pub mod similarity;
pub mod tokenizer;

pub use hash_embedder::HashEmbedder;
pub use similarity::cosine_similarity;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedder `{embedder}` produced {actual} dimensions, expected {expected}")]
    Dimension {
        embedder: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("embedder `{embedder}` failed: {message}")]
    Backend {
        embedder: &'static str,
        message: String,
    },
}

/// Text embedding capability.
///
/// Implementations must be deterministic for a given input and safe to share
/// across threads once constructed.
pub trait TextEmbedder: Send + Sync {
    /// Implementation name ("hash", ...), recorded in logs.
    fn name(&self) -> &'static str;

    /// Bump when tokenization or hashing changes.
    fn version(&self) -> &str;

    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Cosine similarity of two texts. Returns 0.0 when either side has a zero norm.
    fn text_similarity(&self, a: &str, b: &str) -> Result<f32, EmbeddingError> {
        let left = self.embed(a)?;
        let right = self.embed(b)?;
        for vector in [&left, &right] {
            if vector.len() != self.dimension() {
                return Err(EmbeddingError::Dimension {
                    embedder: self.name(),
                    expected: self.dimension(),
                    actual: vector.len(),
                });
            }
        }
        Ok(cosine_similarity(&left, &right))
    }
}

pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Builds an embedder by name. `none` (or an empty name) means no embedder.
pub fn create_embedder(name: &str, dimension: usize) -> Option<Box<dyn TextEmbedder>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "hash" => Some(Box::new(HashEmbedder::new(dimension))),
        "" | "none" | "off" => None,
        other => {
            warn!(embedder = other, "unknown embedder; scoring without embeddings");
            None
        }
    }
}
