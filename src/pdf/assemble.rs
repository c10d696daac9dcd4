use crate::error::AssemblyError;
use crate::pdf::document::root_pages_id;
use crate::pdf::PdfDocument;
use crate::pdf::render::TocPages;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Open `original_path` and put the TOC pages in front of its pages.
pub fn assemble<P: AsRef<Path>>(
    original_path: P,
    toc: TocPages,
) -> Result<PdfDocument, AssemblyError> {
    let mut original = PdfDocument::open(original_path)?;
    prepend_pages(&mut original.doc, toc)?;
    Ok(original)
}

/// Move every page of `toc` to the start of `target`'s page tree. Existing
/// objects of `target` are left as they are, apart from the root `Pages`
/// node's `Kids` and `Count`.
pub fn prepend_pages(target: &mut Document, toc: TocPages) -> Result<usize, AssemblyError> {
    let target_root = root_pages_id(target)?;

    let mut source = toc.doc;
    source.renumber_objects_with(target.max_id + 1);

    let source_pages: Vec<ObjectId> = source.get_pages().into_values().collect();
    let source_max_id = source.max_id;

    for (id, object) in source.objects {
        match object.type_name().unwrap_or(b"") {
            b"Catalog" | b"Pages" => continue,
            _ => {
                target.objects.insert(id, object);
            }
        }
    }
    target.max_id = target.max_id.max(source_max_id);

    for page_id in &source_pages {
        target
            .get_dictionary_mut(*page_id)
            .map_err(tree_error)?
            .set("Parent", Object::Reference(target_root));
    }

    let root = target.get_dictionary_mut(target_root).map_err(tree_error)?;
    let count = root.get(b"Count").and_then(Object::as_i64).map_err(tree_error)?;
    let kids = root
        .get_mut(b"Kids")
        .and_then(Object::as_array_mut)
        .map_err(tree_error)?;
    let mut merged: Vec<Object> = source_pages.iter().map(|id| Object::Reference(*id)).collect();
    merged.append(kids);
    *kids = merged;
    root.set("Count", count + source_pages.len() as i64);

    Ok(source_pages.len())
}

fn tree_error(err: lopdf::Error) -> AssemblyError {
    AssemblyError::PageTree(err.to_string())
}
