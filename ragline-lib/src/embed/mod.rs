//! Text embedding using local models
//!
//! Uses sentence-transformers/all-MiniLM-L6-v2 via the fastembed crate (ONNX runtime).
//!
//! # Model Details
//!
//! - Dimensions: 384
//! - Max tokens: 256
//!
//! # Usage
//!
//! ```ignore
//! use ragline_lib::embed::{Embedder, MiniLmEmbedder};
//!
//! let mut embedder = MiniLmEmbedder::new()?;
//! let embedding = embedder.embed("Polymorphism lets one interface serve many types.")?;
//! assert_eq!(embedding.len(), embedder.dimension());
//! ```

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
///
/// Every embedding produced by one [`Embedder`] has exactly
/// [`Embedder::dimension`] elements.
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send {
    /// Embed a single text.
    ///
    /// Fails with [`Error::Embedding`] if the model is unavailable or the
    /// text is empty.
    fn embed(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Rejects inputs no model can encode meaningfully.
pub(crate) fn ensure_encodable(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::Embedding("cannot embed empty text".to_string()));
    }
    Ok(())
}

/// Checks a model output against the dimension fixed at construction.
pub(crate) fn ensure_dimension(embedding: &[f32], expected: usize) -> Result<()> {
    if embedding.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: embedding.len(),
        });
    }
    Ok(())
}

mod minilm;
pub use minilm::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_rejected() {
        assert!(matches!(ensure_encodable(""), Err(Error::Embedding(_))));
        assert!(matches!(ensure_encodable("  \n\t"), Err(Error::Embedding(_))));
        assert!(ensure_encodable("polymorphism").is_ok());
    }

    #[test]
    fn test_dimension_check() {
        assert!(ensure_dimension(&[0.0; 4], 4).is_ok());
        assert!(matches!(
            ensure_dimension(&[0.0; 3], 4),
            Err(Error::DimensionMismatch { expected: 4, actual: 3 })
        ));
    }
}
