//! Runtime configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file:
//!
//! | Variable                        | Default                            |
//! |---------------------------------|------------------------------------|
//! | `RAGLINE_DB_PATH`               | `ragline.db`                       |
//! | `RAGLINE_EMBEDDING_DIM`         | `384`                              |
//! | `GROQ_API_KEY`                  | none (required to generate)        |
//! | `GROQ_MODEL`                    | `llama3-8b-8192`                   |
//! | `GROQ_BASE_URL`                 | `https://api.groq.com/openai/v1`   |
//! | `RAGLINE_REQUEST_TIMEOUT_SECS`  | `30`                               |
//! | `RAGLINE_TOP_K`                 | `3`                                |
//! | `RAGLINE_MAX_CONTEXT_CHARS`     | `1000`                             |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::embed::MINILM_DIMENSION;
use crate::generate::{GroqGenerator, GROQ_BASE_URL, GROQ_DEFAULT_MODEL};
use crate::pipeline::{DEFAULT_MAX_CONTEXT_CHARS, DEFAULT_TOP_K};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub embedding_dimension: usize,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
    pub request_timeout_secs: u64,
    pub top_k: usize,
    pub max_context_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("ragline.db"),
            embedding_dimension: MINILM_DIMENSION,
            groq_api_key: None,
            groq_model: GROQ_DEFAULT_MODEL.to_string(),
            groq_base_url: GROQ_BASE_URL.to_string(),
            request_timeout_secs: 30,
            top_k: DEFAULT_TOP_K,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            db_path: text("RAGLINE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            embedding_dimension: parse(&lookup, "RAGLINE_EMBEDDING_DIM")?
                .unwrap_or(defaults.embedding_dimension),
            groq_api_key: text("GROQ_API_KEY"),
            groq_model: text("GROQ_MODEL").unwrap_or(defaults.groq_model),
            groq_base_url: text("GROQ_BASE_URL").unwrap_or(defaults.groq_base_url),
            request_timeout_secs: parse(&lookup, "RAGLINE_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            top_k: parse(&lookup, "RAGLINE_TOP_K")?.unwrap_or(defaults.top_k),
            max_context_chars: parse(&lookup, "RAGLINE_MAX_CONTEXT_CHARS")?
                .unwrap_or(defaults.max_context_chars),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build the Groq generator this configuration describes.
    pub fn generator(&self) -> Result<GroqGenerator> {
        let api_key = self
            .groq_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("GROQ_API_KEY is not set".to_string()))?;

        GroqGenerator::with_options(
            api_key,
            self.groq_model.as_str(),
            self.groq_base_url.as_str(),
            self.request_timeout(),
        )
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid {key} {raw:?}: {e}"))),
        _ => Ok(None),
    }
}
