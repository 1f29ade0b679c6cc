//! Text sources feeding ingestion
//!
//! - [`LineSource`]: one text per line, duplicates dropped
//! - [`DocumentSource`]: a whole document as a single text
//!
//! # Implementing a TextSource
//!
//! ```ignore
//! use ragline_lib::source::TextSource;
//!
//! struct Fixed(Vec<String>);
//!
//! impl TextSource for Fixed {
//!     fn load_texts(&self) -> ragline_lib::Result<Vec<String>> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

use crate::Result;

/// Trait for anything that yields texts to ingest, in order.
pub trait TextSource {
    fn load_texts(&self) -> Result<Vec<String>>;
}

mod document;
mod lines;

pub use document::*;
pub use lines::*;
