use crate::error::AssemblyError;
use lopdf::{Document, ObjectId};
use std::path::Path;

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AssemblyError> {
        let path = path.as_ref();
        let doc = Document::load(path).map_err(|e| AssemblyError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), AssemblyError> {
        let path = path.as_ref();
        self.doc.save(path).map_err(|e| AssemblyError::Save {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

pub(crate) fn root_pages_id(doc: &Document) -> Result<ObjectId, AssemblyError> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(|pages| pages.as_reference())
        .map_err(|e| AssemblyError::PageTree(format!("missing root Pages node: {}", e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    impl PdfDocument {
        /// 1-indexed page object IDs in page order.
        pub(crate) fn page_ids(&self) -> Vec<(u32, ObjectId)> {
            let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
            pages.sort_by_key(|(num, _)| *num);
            pages
        }
    }

    /// A Courier-based document with one page per entry. Each `\n`-separated
    /// line of an entry is shown on its own text line; empty entries get an
    /// empty content stream.
    pub(crate) fn sample_pdf(page_texts: &[&str]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for text in page_texts {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                let mut ops = vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("TL", vec![28.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                ];
                for (idx, line) in text.split('\n').enumerate() {
                    if idx > 0 {
                        ops.push(Operation::new("T*", vec![]));
                    }
                    ops.push(Operation::new("Tj", vec![Object::string_literal(line)]));
                }
                ops.push(Operation::new("ET", vec![]));
                ops
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_texts.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    pub(crate) fn write_sample_pdf(path: &Path, page_texts: &[&str]) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        sample_pdf(page_texts).save(path).unwrap();
    }

    #[test]
    fn test_open_and_count_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        write_sample_pdf(&path, &["ONE", "TWO", "THREE"]);

        let doc = PdfDocument::open(&path).unwrap();
        assert_eq!(doc.page_count(), 3);
        let numbers: Vec<u32> = doc.page_ids().into_iter().map(|(n, _)| n).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(root_pages_id(&doc.doc).is_ok());
    }

    #[test]
    fn test_open_garbage_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"%PDF-1.4 nonsense").unwrap();
        assert!(matches!(
            PdfDocument::open(&path),
            Err(AssemblyError::Load { .. })
        ));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.pdf");
        write_sample_pdf(&path, &["ONE"]);

        let mut doc = PdfDocument::open(&path).unwrap();
        let err = doc.save(dir.path().join("missing/out.pdf")).unwrap_err();
        assert!(matches!(err, AssemblyError::Save { .. }));
    }
}
