//! ragline - retrieval-augmented answering over a document
//!
//! # Architecture
//!
//! ```text
//! Source -> Embedder -> Store
//!                         |
//! Query -> Embedder -> Search -> Context -> Generator -> Answer
//!                                                  |
//!                                  Store (query log) <-+
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ragline_lib::{
//!     config::Config,
//!     embed::MiniLmEmbedder,
//!     pipeline::Pipeline,
//!     source::{DocumentSource, TextSource},
//!     store::{SqliteStore, VectorStore},
//! };
//!
//! let config = Config::from_env()?;
//! let mut store = SqliteStore::open(&config.db_path, config.embedding_dimension)?;
//! store.initialize()?;
//!
//! let mut pipeline = Pipeline::new(MiniLmEmbedder::new()?, store, config.generator()?)?;
//!
//! // Index a document
//! let texts = DocumentSource::new("documents.txt").load_texts()?;
//! pipeline.ingest(&texts)?;
//!
//! // Ask
//! let result = pipeline.answer("what is polymorphism?")?;
//! ```

pub mod config;
pub mod embed;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod source;
pub mod store;

pub use error::{Error, Result};
