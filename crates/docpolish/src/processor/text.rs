use crate::config::schema::DocumentFormat;
use crate::error::ExtractionError;
use crate::processor::DocumentProcessor;

/// Plain text, Markdown and reStructuredText, taken verbatim.
pub struct TextProcessor;

impl TextProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for TextProcessor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format.is_plain_text()
    }
}
