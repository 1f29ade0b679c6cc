use tracing::debug;

use crate::embed::Embedding;
use crate::store::{check_dimension, check_top_k, cosine_distance, QueryLogEntry, SearchHit, VectorStore};
use crate::{Error, Result};

struct StoredChunk {
    text: String,
    embedding: Embedding,
}

/// In-memory vector store for development and testing.
///
/// Uses brute-force cosine similarity search over chunks kept in insertion
/// order. Storage ids are not retained.
pub struct MemoryStore {
    dimension: usize,
    chunks: Vec<StoredChunk>,
    log: Vec<QueryLogEntry>,
    closed: bool,
}

impl MemoryStore {
    /// Create a new empty in-memory store for embeddings of `dimension`.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            chunks: Vec::new(),
            log: Vec::new(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Persistence("store is closed".to_string()));
        }
        Ok(())
    }
}

impl VectorStore for MemoryStore {
    fn initialize(&mut self) -> Result<()> {
        self.ensure_open()
    }

    fn add_chunk(&mut self, id: &str, text: &str, embedding: &[f32]) -> Result<()> {
        self.ensure_open()?;
        check_dimension(embedding, self.dimension)?;

        debug!(id, "storing chunk in memory");
        self.chunks.push(StoredChunk {
            text: text.to_string(),
            embedding: embedding.to_vec(),
        });
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        self.ensure_open()?;
        check_top_k(top_k)?;
        check_dimension(query, self.dimension)?;

        let mut scored: Vec<(f32, &StoredChunk)> = self
            .chunks
            .iter()
            .map(|chunk| (cosine_distance(query, &chunk.embedding), chunk))
            .collect();

        // stable: equal distances keep insertion order
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(distance, chunk)| SearchHit {
                text: chunk.text.clone(),
                similarity: 1.0 - distance,
            })
            .collect())
    }

    fn log_query(&mut self, query: &str, response: &str) -> Result<()> {
        self.ensure_open()?;
        self.log.push(QueryLogEntry {
            query: query.to_string(),
            response: response.to_string(),
        });
        Ok(())
    }

    fn query_log(&self) -> Result<Vec<QueryLogEntry>> {
        self.ensure_open()?;
        Ok(self.log.clone())
    }

    fn clear_chunks(&mut self) -> Result<()> {
        self.ensure_open()?;
        debug!(removed = self.chunks.len(), "clearing in-memory chunks");
        self.chunks.clear();
        Ok(())
    }

    fn chunk_count(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.chunks.len())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
