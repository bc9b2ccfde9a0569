//! Text extraction from submitted documents.

pub mod docx;
pub mod pdf;
pub mod text;
pub mod url;

use crate::config::schema::DocumentFormat;
use crate::error::ExtractionError;

pub use url::{html_to_text, validate_url, UrlFetcher};

pub trait DocumentProcessor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

pub struct ProcessorRegistry {
    processors: Vec<Box<dyn DocumentProcessor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        let processors: Vec<Box<dyn DocumentProcessor>> = vec![
            Box::new(text::TextProcessor::new()),
            Box::new(pdf::PdfProcessor::new()),
            Box::new(docx::DocxProcessor::new()),
        ];

        Self { processors }
    }

    /// Extracts text, choosing the processor from the filename's extension.
    pub fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        let format = DocumentFormat::from_extension(extension)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(extension.to_string()))?;

        self.extract_format(format, bytes)
    }

    pub fn extract_format(
        &self,
        format: DocumentFormat,
        bytes: &[u8],
    ) -> Result<String, ExtractionError> {
        for processor in &self.processors {
            if processor.supports(format) {
                return processor.extract(bytes);
            }
        }

        Err(ExtractionError::UnsupportedFormat(format!("{:?}", format)))
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
