use serde::{Deserialize, Serialize};

/// Label recorded on every [`RetrievalResult`].
pub const RETRIEVAL_METHOD: &str = "vector search";

/// Scores attached to a retrieved document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Cosine similarity between the query and the document, in [-1, 1]
    pub similarity_score: f32,
}

/// One search hit, as presented to callers
///
/// `document_id` is the hit's rank in this result (`doc_0` is the best
/// match). It is unrelated to the storage id assigned at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub document_id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl RetrievedDocument {
    #[must_use]
    pub fn similarity_score(&self) -> f32 {
        self.metadata.similarity_score
    }
}

/// Everything produced by one query/response cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub query: String,
    pub retrieved_documents: Vec<RetrievedDocument>,
    pub retrieval_method: String,
    pub generated_response: Option<String>,
}

/// Outcome of an ingestion batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Storage ids of the texts that were embedded and stored
    pub stored: Vec<String>,
    /// Storage ids of the texts that could not be embedded
    pub skipped: Vec<String>,
}
