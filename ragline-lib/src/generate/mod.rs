//! Answer generation with a hosted language model
//!
//! A [`Generator`] turns retrieved context plus the user's question into an
//! answer. Implementations report every failure as [`Error::Generation`];
//! deciding what to show the user instead is left to the caller.
//!
//! [`Error::Generation`]: crate::Error::Generation

use crate::{Error, Result};

/// System message sent with every generation request.
pub const SYSTEM_PROMPT: &str =
    "You are an assistant that provides direct answers based on the given context.";

/// Trait for answer generators
pub trait Generator: Send {
    /// Answer `query` grounded in `context`.
    fn generate(&mut self, context: &str, query: &str) -> Result<String>;
}

/// Placeholder for pipelines that only ingest.
///
/// Every call fails, so a query cycle run through it records the fallback
/// answer.
pub struct NoGenerator;

impl Generator for NoGenerator {
    fn generate(&mut self, _context: &str, _query: &str) -> Result<String> {
        Err(Error::Generation("no generator configured".to_string()))
    }
}

/// Build the user prompt for one question.
#[must_use]
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "You are an expert in programming languages. Based on the context provided, \
         please answer the following question directly:\n\
         Context: {context}\n\
         Question: {query}"
    )
}

mod groq;
pub use groq::*;
