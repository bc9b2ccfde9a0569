use crate::config::schema::DocumentFormat;
use crate::error::ExtractionError;
use crate::processor::DocumentProcessor;

/// Embedded text of a PDF. Scanned PDFs yield no text and fail later as blank.
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for PdfProcessor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let _span = tracing::info_span!("processor.pdf", bytes = bytes.len()).entered();

        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| ExtractionError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;

        Ok(extract_text_from_pdf(&doc))
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Pdf)
    }
}

fn extract_text_from_pdf(doc: &lopdf::Document) -> String {
    let mut text = String::new();

    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => {
                tracing::warn!("Failed to extract text from PDF page {}: {}", page_num, e);
            }
        }
    }

    text
}
