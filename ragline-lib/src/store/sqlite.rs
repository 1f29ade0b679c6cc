use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::store::{
    check_dimension, check_top_k, cosine_distance, decode_embedding, encode_embedding,
    QueryLogEntry, SearchHit, VectorStore,
};
use crate::{Error, Result};

const SCHEMA: &str = r#"
    -- One row per ingested chunk; embeddings are little-endian f32 blobs
    CREATE TABLE IF NOT EXISTS embeddings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text_id TEXT,
        text_content TEXT NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE TABLE IF NOT EXISTS query_responses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        query TEXT NOT NULL,
        response TEXT NOT NULL
    );
"#;

const SEARCH_SQL: &str = r#"
    SELECT text_content, cosine_distance(embedding, ?1) AS distance
    FROM embeddings
    ORDER BY distance ASC, id ASC
    LIMIT ?2
"#;

/// Vector store backed by SQLite.
///
/// Ranking happens inside SQLite: [`SqliteStore::initialize`] registers a
/// `cosine_distance(blob, blob)` SQL function on the connection and
/// [`VectorStore::search`] orders by it, breaking ties by row id (insertion
/// order).
pub struct SqliteStore {
    conn: Option<Connection>,
    dimension: usize,
    initialized: bool,
}

impl SqliteStore {
    /// Open (or create) a store at `db_path` for embeddings of `dimension`.
    ///
    /// Call [`VectorStore::initialize`] before using it.
    pub fn open(db_path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let db_path = db_path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        info!(path = %db_path.display(), dimension, "opened vector store");

        Ok(Self::from_connection(conn, dimension))
    }

    /// Open a private in-memory database. Nothing is written to disk.
    pub fn open_in_memory(dimension: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn, dimension))
    }

    fn from_connection(conn: Connection, dimension: usize) -> Self {
        Self {
            conn: Some(conn),
            dimension,
            initialized: false,
        }
    }

    fn handle(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::Persistence("store is closed".to_string()))
    }

    fn ready(&self) -> Result<&Connection> {
        let conn = self.handle()?;
        if !self.initialized {
            return Err(Error::Schema("store is not initialized".to_string()));
        }
        Ok(conn)
    }
}

impl VectorStore for SqliteStore {
    fn initialize(&mut self) -> Result<()> {
        let conn = self.handle()?;

        register_vector_functions(conn)
            .map_err(|e| Error::Schema(format!("vector similarity unavailable: {e}")))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::Schema(format!("failed to create tables: {e}")))?;

        let stored_bytes: Option<i64> = conn
            .query_row("SELECT length(embedding) FROM embeddings LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        if let Some(bytes) = stored_bytes {
            let stored = bytes as usize / std::mem::size_of::<f32>();
            if stored != self.dimension {
                return Err(Error::Schema(format!(
                    "existing embeddings have dimension {stored}, store configured for {}",
                    self.dimension
                )));
            }
        }

        self.initialized = true;
        debug!(dimension = self.dimension, "vector store schema ready");
        Ok(())
    }

    fn add_chunk(&mut self, id: &str, text: &str, embedding: &[f32]) -> Result<()> {
        let conn = self.ready()?;
        check_dimension(embedding, self.dimension)?;

        conn.execute(
            "INSERT INTO embeddings (text_id, text_content, embedding) VALUES (?1, ?2, ?3)",
            params![id, text, encode_embedding(embedding)],
        )?;
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let conn = self.ready()?;
        check_top_k(top_k)?;
        check_dimension(query, self.dimension)?;

        let limit = i64::try_from(top_k).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(SEARCH_SQL)?;
        let hits = stmt
            .query_map(params![encode_embedding(query), limit], |row| {
                let distance: f64 = row.get(1)?;
                Ok(SearchHit {
                    text: row.get(0)?,
                    similarity: (1.0 - distance) as f32,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(hits)
    }

    fn log_query(&mut self, query: &str, response: &str) -> Result<()> {
        let conn = self.ready()?;
        conn.execute(
            "INSERT INTO query_responses (query, response) VALUES (?1, ?2)",
            params![query, response],
        )?;
        Ok(())
    }

    fn query_log(&self) -> Result<Vec<QueryLogEntry>> {
        let conn = self.ready()?;
        let mut stmt = conn.prepare("SELECT query, response FROM query_responses ORDER BY id")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(QueryLogEntry {
                    query: row.get(0)?,
                    response: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    fn clear_chunks(&mut self) -> Result<()> {
        let conn = self.ready()?;
        let removed = conn.execute("DELETE FROM embeddings", [])?;
        info!(removed, "cleared stored chunks");
        Ok(())
    }

    fn chunk_count(&self) -> Result<usize> {
        let conn = self.ready()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        self.initialized = false;
        conn.close()
            .map_err(|(_, e)| Error::Persistence(format!("failed to close store: {e}")))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Register `cosine_distance(a, b)` over embedding blobs.
fn register_vector_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "cosine_distance",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let a: Vec<u8> = ctx.get(0)?;
            let b: Vec<u8> = ctx.get(1)?;
            if a.len() != b.len() {
                return Err(rusqlite::Error::UserFunctionError(
                    "cosine_distance: vectors differ in length".into(),
                ));
            }
            Ok(f64::from(cosine_distance(
                &decode_embedding(&a),
                &decode_embedding(&b),
            )))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ready_store(dimension: usize) -> SqliteStore {
        let mut store = SqliteStore::open_in_memory(dimension).unwrap();
        store.initialize().unwrap();
        store
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut store = ready_store(3);
        store.add_chunk("0", "kept", &[1.0, 0.0, 0.0]).unwrap();

        store.initialize().unwrap();
        store.initialize().unwrap();

        assert_eq!(store.chunk_count().unwrap(), 1);
    }

    #[test]
    fn test_operations_require_initialize() {
        let store = SqliteStore::open_in_memory(3).unwrap();
        assert!(matches!(store.search(&[1.0, 0.0, 0.0], 1), Err(Error::Schema(_))));
    }

    #[test]
    fn test_search_returns_sorted() {
        let mut store = ready_store(3);
        store.add_chunk("0", "far away", &[0.0, 1.0, 0.0]).unwrap();
        store.add_chunk("1", "very close", &[1.0, 0.0, 0.0]).unwrap();
        store.add_chunk("2", "medium", &[0.5, 0.5, 0.0]).unwrap();
        store.add_chunk("3", "opposite", &[-1.0, 0.0, 0.0]).unwrap();

        let hits = store.search(&[1.0, 0.0, 0.0], 4).unwrap();

        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["very close", "medium", "far away", "opposite"]);
        for pair in hits.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        assert!((hits[3].similarity + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_identical_vector_scores_one() {
        let mut store = ready_store(4);
        let embedding = [0.3, -0.7, 0.2, 0.9];
        store.add_chunk("0", "foo", &embedding).unwrap();
        store.add_chunk("1", "bar", &[0.9, 0.1, 0.0, -0.4]).unwrap();

        let hits = store.search(&embedding, 1).unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "foo");
        assert!((hits[0].similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let mut store = ready_store(2);
        store.add_chunk("0", "first", &[0.0, 1.0]).unwrap();
        store.add_chunk("1", "second", &[0.0, 2.0]).unwrap();
        store.add_chunk("2", "better", &[1.0, 0.0]).unwrap();
        store.add_chunk("3", "third", &[0.0, 3.0]).unwrap();

        let hits = store.search(&[0.0, 1.0], 3).unwrap();

        let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_store_search() {
        let store = ready_store(2);
        for top_k in [1, 3, 50] {
            assert!(store.search(&[1.0, 0.0], top_k).unwrap().is_empty());
        }
    }

    #[test]
    fn test_top_k_zero_is_invalid() {
        let store = ready_store(2);
        assert!(matches!(store.search(&[1.0, 0.0], 0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_dimension_mismatch_leaves_store_unchanged() {
        let mut store = ready_store(3);
        store.add_chunk("0", "ok", &[1.0, 0.0, 0.0]).unwrap();

        let err = store.add_chunk("1", "bad", &[1.0, 0.0, 0.0, 0.0]).unwrap_err();

        assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 4 }));
        assert_eq!(store.chunk_count().unwrap(), 1);
    }

    #[test]
    fn test_query_dimension_checked() {
        let store = ready_store(3);
        assert!(matches!(
            store.search(&[1.0, 0.0], 1),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_query_log_is_append_only_and_ordered() {
        let mut store = ready_store(2);
        store.log_query("first?", "one").unwrap();
        store.log_query("second?", "two").unwrap();
        store.log_query("first?", "one again").unwrap();

        let log = store.query_log().unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log[0].query, "first?");
        assert_eq!(log[1].response, "two");
        assert_eq!(log[2].response, "one again");
    }

    #[test]
    fn test_clear_keeps_query_log() {
        let mut store = ready_store(2);
        store.add_chunk("0", "a", &[1.0, 0.0]).unwrap();
        store.log_query("q", "r").unwrap();

        store.clear_chunks().unwrap();

        assert_eq!(store.chunk_count().unwrap(), 0);
        assert_eq!(store.query_log().unwrap().len(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut store = ready_store(2);
        store.close().unwrap();
        store.close().unwrap();

        assert!(matches!(store.chunk_count(), Err(Error::Persistence(_))));
        assert!(matches!(store.initialize(), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ragline.db");

        let mut store = SqliteStore::open(&path, 2).unwrap();
        store.initialize().unwrap();
        store.add_chunk("0", "persisted", &[1.0, 0.0]).unwrap();
        store.log_query("q", "r").unwrap();
        store.close().unwrap();

        let mut reopened = SqliteStore::open(&path, 2).unwrap();
        reopened.initialize().unwrap();

        assert_eq!(reopened.chunk_count().unwrap(), 1);
        assert_eq!(reopened.search(&[1.0, 0.0], 1).unwrap()[0].text, "persisted");
        assert_eq!(reopened.query_log().unwrap().len(), 1);
    }

    #[test]
    fn test_nan_embedding_ranks_last() {
        let mut store = ready_store(2);
        store.add_chunk("0", "broken", &[f32::NAN, 1.0]).unwrap();
        store.add_chunk("1", "fine", &[0.0, 1.0]).unwrap();

        let hits = store.search(&[1.0, 0.0], 2).unwrap();

        assert_eq!(hits[0].text, "fine");
        assert_eq!(hits[1].text, "broken");
        assert_eq!(hits[1].similarity, -1.0);

        let hits = store.search(&[f32::NAN, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_reopen_with_other_dimension_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ragline.db");

        let mut store = SqliteStore::open(&path, 2).unwrap();
        store.initialize().unwrap();
        store.add_chunk("0", "two dims", &[1.0, 0.0]).unwrap();
        store.close().unwrap();

        let mut reopened = SqliteStore::open(&path, 384).unwrap();
        assert!(matches!(reopened.initialize(), Err(Error::Schema(_))));
    }
}
