use crate::pipeline::RetrievedDocument;

/// How many top-ranked documents feed the generation context.
pub const CONTEXT_DOCUMENTS: usize = 3;

/// Join the first [`CONTEXT_DOCUMENTS`] documents with single spaces and cut
/// the result to at most `max_chars` characters.
///
/// The cut is a hard one and may land mid-word. It counts chars, not bytes,
/// so multi-byte text is never split inside a code point.
#[must_use]
pub fn assemble_context(documents: &[RetrievedDocument], max_chars: usize) -> String {
    let joined = documents
        .iter()
        .take(CONTEXT_DOCUMENTS)
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    match joined.char_indices().nth(max_chars) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}
