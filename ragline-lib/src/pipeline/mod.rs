//! Retrieval-augmented answering
//!
//! Combines embedder, store and generator into ingestion and query cycles.
//!
//! # Usage
//!
//! ```ignore
//! use ragline_lib::pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::new(embedder, store, generator)?;
//! let report = pipeline.ingest(&texts)?;
//! let result = pipeline.answer("what is polymorphism?")?;
//! println!("{}", result.generated_response.unwrap_or_default());
//! pipeline.close()?;
//! ```
//!
//! # Failure policy
//!
//! - An embedding failure during [`Pipeline::ingest`] skips that text only.
//! - An embedding failure during [`Pipeline::answer_query`] aborts the cycle.
//! - A generation failure never aborts a cycle; the answer becomes
//!   [`GENERATION_FALLBACK`] and is logged like any other answer.
//! - Store failures always propagate.

use tracing::{debug, error, info, warn};

use crate::embed::Embedder;
use crate::generate::{Generator, NoGenerator};
use crate::store::VectorStore;
use crate::{Error, Result};

/// Answer recorded when the generator fails.
pub const GENERATION_FALLBACK: &str = "Error generating response.";

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 1000;

/// Retrieval pipeline owning its embedder, store and generator.
pub struct Pipeline<E: Embedder, S: VectorStore, G: Generator = NoGenerator> {
    embedder: E,
    store: S,
    generator: G,
}

// Constructor for ingestion-only pipelines
impl<E: Embedder, S: VectorStore> Pipeline<E, S, NoGenerator> {
    /// Create a pipeline without a generator.
    ///
    /// Queries still run, but every answer is [`GENERATION_FALLBACK`].
    pub fn without_generator(embedder: E, store: S) -> Result<Self> {
        Self::new(embedder, store, NoGenerator)
    }
}

impl<E: Embedder, S: VectorStore, G: Generator> Pipeline<E, S, G> {
    /// Create a pipeline. The store should already be initialized.
    ///
    /// Fails with [`Error::DimensionMismatch`] when the embedder and the
    /// store disagree on the vector dimension.
    pub fn new(embedder: E, store: S, generator: G) -> Result<Self> {
        if embedder.dimension() != store.dimension() {
            return Err(Error::DimensionMismatch {
                expected: store.dimension(),
                actual: embedder.dimension(),
            });
        }

        Ok(Self {
            embedder,
            store,
            generator,
        })
    }

    /// Embed and store `texts`.
    ///
    /// Text `i` gets the storage id `i.to_string()`, so ids follow input
    /// order and a skipped text leaves a gap rather than shifting later ids.
    pub fn ingest<T: AsRef<str>>(&mut self, texts: &[T]) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for (idx, text) in texts.iter().enumerate() {
            let id = idx.to_string();
            let text = text.as_ref();

            let embedding = match self.embedder.embed(text) {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!(id = %id, error = %e, "skipping text that could not be embedded");
                    report.skipped.push(id);
                    continue;
                }
            };

            self.store.add_chunk(&id, text, &embedding)?;
            debug!(id = %id, chars = text.len(), "stored chunk");
            report.stored.push(id);
        }

        info!(
            stored = report.stored.len(),
            skipped = report.skipped.len(),
            "ingestion finished"
        );
        Ok(report)
    }

    /// Run one query cycle with the default `top_k` and context size.
    pub fn answer(&mut self, query: &str) -> Result<RetrievalResult> {
        self.answer_query(query, DEFAULT_TOP_K, DEFAULT_MAX_CONTEXT_CHARS)
    }

    /// Run one query cycle: embed, search, assemble context, generate, log.
    ///
    /// # Arguments
    /// * `query` - The user's question
    /// * `top_k` - Number of documents to retrieve
    /// * `max_context_chars` - Upper bound on the context handed to the generator
    pub fn answer_query(
        &mut self,
        query: &str,
        top_k: usize,
        max_context_chars: usize,
    ) -> Result<RetrievalResult> {
        let query_embedding = self.embedder.embed(query)?;
        let hits = self.store.search(&query_embedding, top_k)?;
        debug!(hits = hits.len(), top_k, "retrieved documents");

        let retrieved_documents: Vec<RetrievedDocument> = hits
            .into_iter()
            .enumerate()
            .map(|(rank, hit)| RetrievedDocument {
                document_id: format!("doc_{rank}"),
                content: hit.text,
                metadata: DocumentMetadata {
                    similarity_score: hit.similarity,
                },
            })
            .collect();

        let context = assemble_context(&retrieved_documents, max_context_chars);

        let response = match self.generator.generate(&context, query) {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "error generating response");
                GENERATION_FALLBACK.to_string()
            }
        };

        self.store.log_query(query, &response)?;

        Ok(RetrievalResult {
            query: query.to_string(),
            retrieved_documents,
            retrieval_method: RETRIEVAL_METHOD.to_string(),
            generated_response: Some(response),
        })
    }

    /// Close the underlying store.
    pub fn close(&mut self) -> Result<()> {
        self.store.close()
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Returns a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a mutable reference to the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Returns a reference to the generator.
    #[must_use]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Take the pipeline apart.
    pub fn into_parts(self) -> (E, S, G) {
        (self.embedder, self.store, self.generator)
    }
}

mod context;
mod result;

pub use context::*;
pub use result::*;
