use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::source::TextSource;
use crate::Result;

/// Line-oriented source: every non-empty line is one text.
///
/// Repeated lines are dropped after their first occurrence; the remaining
/// lines keep file order. A missing file is an [`Error::Io`].
///
/// [`Error::Io`]: crate::Error::Io
pub struct LineSource {
    pub path: PathBuf,
}

impl LineSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSource for LineSource {
    fn load_texts(&self) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(&self.path)?;
        let texts = unique_lines(&content);
        debug!(path = %self.path.display(), texts = texts.len(), "loaded line source");
        Ok(texts)
    }
}

fn unique_lines(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .lines()
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}
