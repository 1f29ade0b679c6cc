//! Vector storage backends
//!
//! [`SqliteStore`] persists chunks to disk and ranks them inside SQLite;
//! [`MemoryStore`] keeps everything in process and is a drop-in for tests
//! and throwaway sessions.
//!
//! # Storage Model
//!
//! Each stored chunk consists of:
//! - a storage identifier assigned at ingestion (`"0"`, `"1"`, ...)
//! - the original text
//! - its embedding, always [`VectorStore::dimension`] long
//!
//! Alongside the chunks every store keeps an append-only log of
//! query/response pairs.
//!
//! # Ranking
//!
//! Similarity is `1 - cosine_distance`, so scores fall in `[-1, 1]` and
//! higher is closer. Chunks with equal similarity come back in insertion
//! order.
//!
//! # Usage
//!
//! ```ignore
//! use ragline_lib::store::{SqliteStore, VectorStore};
//!
//! let mut store = SqliteStore::open("ragline.db", 384)?;
//! store.initialize()?;
//! store.add_chunk("0", "Polymorphism is ...", &embedding)?;
//!
//! let hits = store.search(&query_embedding, 3)?;
//! store.close()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::embed::Embedding;
use crate::{Error, Result};

/// A search hit with similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The stored chunk text
    pub text: String,
    /// Cosine similarity to the query, in [-1, 1]
    pub similarity: f32,
}

/// One completed query/response cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub query: String,
    pub response: String,
}

/// Trait for vector storage backends
///
/// Writers take `&mut self`; a store is driven by one caller at a time.
pub trait VectorStore: Send {
    /// Ensure the schema exists. Safe to call on every startup.
    fn initialize(&mut self) -> Result<()>;

    /// Insert one chunk.
    ///
    /// Ids are not checked for uniqueness: inserting the same id twice stores
    /// two rows.
    fn add_chunk(&mut self, id: &str, text: &str, embedding: &[f32]) -> Result<()>;

    /// Search for the chunks nearest to `query_embedding`
    ///
    /// # Returns
    /// At most `top_k` hits sorted by similarity (highest first). An empty
    /// store yields an empty vector.
    fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<SearchHit>>;

    /// Append a query/response pair to the log
    fn log_query(&mut self, query: &str, response: &str) -> Result<()>;

    /// Read back the query log, oldest first
    fn query_log(&self) -> Result<Vec<QueryLogEntry>>;

    /// Remove every chunk. The query log is kept.
    fn clear_chunks(&mut self) -> Result<()>;

    /// Number of stored chunks
    fn chunk_count(&self) -> Result<usize>;

    /// Release the underlying handle.
    ///
    /// Closing an already closed store is a no-op. Every other operation on
    /// a closed store fails with [`Error::Persistence`].
    fn close(&mut self) -> Result<()>;

    /// Dimension every stored embedding must have
    fn dimension(&self) -> usize;
}

/// Cosine distance between two vectors, in [0, 2].
///
/// A zero vector has no direction; its distance to anything is 1.0
/// (similarity 0.0). Vectors holding NaN or infinite components are
/// maximally distant (2.0), so they rank last in every backend.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let distance = 1.0 - dot / (norm_a * norm_b);
    if distance.is_finite() {
        distance
    } else {
        2.0
    }
}

pub(crate) fn check_dimension(embedding: &[f32], expected: usize) -> Result<()> {
    if embedding.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: embedding.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(Error::InvalidInput("top_k must be at least 1".to_string()));
    }
    Ok(())
}

/// Little-endian f32 encoding used for embedding blobs.
pub(crate) fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub(crate) fn decode_embedding(bytes: &[u8]) -> Embedding {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

mod memory;
mod sqlite;

pub use memory::*;
pub use sqlite::*;
