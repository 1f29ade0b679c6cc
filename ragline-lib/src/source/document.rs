use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::{debug, error, warn};

use crate::source::TextSource;
use crate::Result;

/// Whole-document source: the file becomes exactly one text.
///
/// Files with a `.pdf` extension have their page text extracted and joined
/// in page order; anything else is read as UTF-8 text. NUL characters left
/// over from extraction are removed. An unreadable file is logged and yields
/// no texts instead of failing.
pub struct DocumentSource {
    pub path: PathBuf,
}

impl DocumentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_pdf(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}

impl TextSource for DocumentSource {
    fn load_texts(&self) -> Result<Vec<String>> {
        let raw = if self.is_pdf() {
            extract_pdf_text(&self.path)
        } else {
            std::fs::read(&self.path)
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .map_err(|e| e.to_string())
        };

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "error reading document");
                return Ok(Vec::new());
            }
        };

        let text: String = raw.chars().filter(|c| *c != '\0').collect();
        debug!(path = %self.path.display(), chars = text.len(), "loaded document");

        Ok(vec![text])
    }
}

/// Concatenate the text of every page. Pages that fail to decode are skipped.
fn extract_pdf_text(path: &Path) -> std::result::Result<String, String> {
    let doc = Document::load(path).map_err(|e| e.to_string())?;
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err("pdf has no pages".to_string());
    }

    let mut text = String::new();
    for page_number in pages.into_keys() {
        match doc.extract_text(&[page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!(page = page_number, error = %e, "skipping unreadable pdf page"),
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// Build a PDF with one page per entry of `pages`.
    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for page in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*page)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_document_is_single_text() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "Page one.\n\nPage two.\nPage one.").unwrap();

        let texts = DocumentSource::new(file.path()).load_texts().unwrap();

        assert_eq!(texts, vec!["Page one.\n\nPage two.\nPage one."]);
    }

    #[test]
    fn test_nul_characters_removed() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"poly\0morph\0ism").unwrap();

        let texts = DocumentSource::new(file.path()).load_texts().unwrap();

        assert_eq!(texts, vec!["polymorphism"]);
    }

    #[test]
    fn test_missing_document_yields_nothing() {
        let texts = DocumentSource::new("/definitely/not/here.pdf").load_texts().unwrap();
        assert!(texts.is_empty());
    }

    #[test]
    fn test_pdf_pages_extracted_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documents.PDF");
        write_pdf(&path, &["Hello polymorphism", "Traits share behaviour"]);

        let texts = DocumentSource::new(&path).load_texts().unwrap();

        assert_eq!(texts.len(), 1);
        let text = &texts[0];
        let first = text.find("Hello polymorphism").unwrap();
        let second = text.find("Traits share behaviour").unwrap();
        assert!(first < second);
        assert!(!text.contains("%PDF"));
        assert!(!text.contains("endstream"));
    }

    #[test]
    fn test_malformed_pdf_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\n1 0 obj\nstream\n\xff\xd8BT (Hello) Tj ET").unwrap();

        let texts = DocumentSource::new(&path).load_texts().unwrap();

        assert!(texts.is_empty());
    }
}
