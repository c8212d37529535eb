//! PDF text extraction, one document per page.

use super::document::file_name_of;
use super::{parse_error, DocumentSet, SourceDocument, SourceKind};
use crate::error::Result;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Load a PDF into a [`DocumentSet`]. Pages without extractable text are skipped.
#[instrument(fields(path = %path.display()))]
pub fn load_pdf(path: &Path) -> Result<DocumentSet> {
    let pdf = lopdf::Document::load(path).map_err(|e| parse_error(SourceKind::Pdf, e))?;
    let file_name = file_name_of(path);

    let mut documents = Vec::new();
    for page_number in pdf.get_pages().into_keys() {
        let text = match pdf.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping page {} of {}: {}", page_number, file_name, e);
                continue;
            }
        };

        if text.trim().is_empty() {
            debug!("Page {} has no text", page_number);
            continue;
        }

        documents.push(SourceDocument::new(
            text,
            file_name.clone(),
            Some(page_number.to_string()),
        ));
    }

    if documents.is_empty() {
        return Err(parse_error(SourceKind::Pdf, "no extractable text found"));
    }

    debug!("Extracted {} pages from {}", documents.len(), file_name);
    Ok(DocumentSet::new(documents))
}

#[cfg(test)]
pub(crate) mod testing {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::path::Path;

    /// Write a PDF with one page per entry; an empty entry yields a blank page.
    pub fn write_pdf(path: &Path, pages: &[&str]) {
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

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
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
}
