//! Document text extraction.
//!
//! Plain-text formats are read as UTF-8. PDF text comes from `pdf-extract`;
//! Word documents are unzipped and the paragraphs of `word/document.xml`
//! are joined with newlines. Anything else is reported as unsupported.

use docchat_core::error::IngestError;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Extensions read as UTF-8 text.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown", "csv", "log", "rst"];

const DOCX_BODY: &str = "word/document.xml";

/// Text pulled from an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// File name without directories.
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Pdf,
    Docx,
}

impl Format {
    fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            ext if TEXT_EXTENSIONS.contains(&ext) => Some(Self::Text),
            _ => None,
        }
    }
}

/// Read `path` and extract its text according to the file extension.
pub fn extract_text(path: impl AsRef<Path>) -> Result<ExtractedDocument, IngestError> {
    let path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let Some(format) = Format::from_extension(&extension) else {
        let shown = if extension.is_empty() {
            "(no extension)".to_string()
        } else {
            format!(".{extension}")
        };
        return Err(IngestError::UnsupportedFormat(shown));
    };

    let failed = |reason: String| IngestError::ExtractionFailed {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| failed(e.to_string()))?;

    let text = match format {
        Format::Text => {
            String::from_utf8(bytes).map_err(|e| failed(format!("not valid UTF-8 text: {e}")))?
        }
        Format::Pdf => pdf_text(&bytes).map_err(failed)?,
        Format::Docx => docx_text(bytes).map_err(failed)?,
    };

    if format != Format::Text && text.trim().is_empty() {
        return Err(failed("no extractable text".to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!(document = %name, ?format, bytes = text.len(), "Extracted document text");
    Ok(ExtractedDocument { name, text })
}

fn pdf_text(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| format!("unreadable PDF: {e}"))
}

fn docx_text(bytes: Vec<u8>) -> Result<String, String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a Word document: {e}"))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| format!("missing {DOCX_BODY}: {e}"))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("unreadable {DOCX_BODY}: {e}"))?;

    paragraphs_from_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

/// Text of each `w:p` paragraph in WordprocessingML, in document order.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t.unescape().map_err(|e| format!("malformed {DOCX_BODY}: {e}"))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "malformed {DOCX_BODY} at byte {}: {e}",
                    reader.buffer_position()
                ));
            }
        }
    }

    Ok(paragraphs)
}
