use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::debug;

use crate::embed::{ensure_dimension, ensure_encodable, Embedder, Embedding};
use crate::{Error, Result};

/// Output dimension of all-MiniLM-L6-v2.
pub const MINILM_DIMENSION: usize = 384;

/// MiniLM embedder using sentence-transformers/all-MiniLM-L6-v2.
///
/// The model is loaded eagerly in [`MiniLmEmbedder::new`], so every call to
/// [`Embedder::embed`] runs against a warm session.
pub struct MiniLmEmbedder {
    model: TextEmbedding,
}

impl MiniLmEmbedder {
    /// Create a new MiniLM embedder.
    ///
    /// Downloads the model on first use (~90MB).
    pub fn new() -> Result<Self> {
        let opts = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self { model })
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

impl Embedder for MiniLmEmbedder {
    fn model_name(&self) -> &str {
        "sentence-transformers/all-MiniLM-L6-v2"
    }

    fn dimension(&self) -> usize {
        MINILM_DIMENSION
    }

    fn embed(&mut self, text: &str) -> Result<Embedding> {
        ensure_encodable(text)?;

        let embedding = self
            .model
            .embed(vec![text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))?;

        ensure_dimension(&embedding, MINILM_DIMENSION)?;
        debug!(chars = text.len(), "embedded text");
        Ok(embedding)
    }
}
