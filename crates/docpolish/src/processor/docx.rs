use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::config::schema::DocumentFormat;
use crate::error::ExtractionError;
use crate::processor::DocumentProcessor;

pub struct DocxProcessor;

impl DocxProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for DocxProcessor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionError::DocxProcessing(format!("Failed to open DOCX: {}", e)))?;

        extract_docx_text(&mut archive)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Docx)
    }
}

fn extract_docx_text<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<String, ExtractionError> {
    let mut document_xml = archive.by_name("word/document.xml").map_err(|e| {
        ExtractionError::DocxProcessing(format!("Failed to find document.xml: {}", e))
    })?;

    let mut xml_content = String::new();
    document_xml.read_to_string(&mut xml_content).map_err(|e| {
        ExtractionError::DocxProcessing(format!("Failed to read document.xml: {}", e))
    })?;

    parse_docx_xml(&xml_content)
}

/// Collects `w:t` runs, ending each `w:p` paragraph with a newline.
fn parse_docx_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);

    let mut text = String::new();
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_element = true;
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e.decode().map_err(|e| {
                        ExtractionError::DocxProcessing(format!("XML decoding error: {}", e))
                    })?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text_element {
                    if let Ok(Some(ch)) = e.resolve_char_ref() {
                        text.push(ch);
                    } else if let Ok(name) = e.decode() {
                        if let Some(resolved) = quick_xml::escape::resolve_predefined_entity(&name)
                        {
                            text.push_str(resolved);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::DocxProcessing(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(text)
}
