//! Document text extraction — turns a stored résumé file into raw text.
//!
//! Dispatch is on MIME type only; no AI calls, no retries. Extraction is
//! synchronous and CPU-bound, so async callers run it on the blocking
//! pool (`tokio::task::spawn_blocking`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// Extracts plain text from a resident file. Unknown MIME types fail with
/// `UnsupportedFormat` and never return partial text.
pub fn extract_text(path: &Path, mime_type: &str) -> Result<String, ExtractionError> {
    // `text/plain; charset=utf-8` and friends dispatch on the base type.
    let base_type = mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_ascii_lowercase();

    match base_type.as_str() {
        MIME_PDF => pdf_extract::extract_text(path).map_err(|e| ExtractionError::Pdf(e.to_string())),
        MIME_DOCX => extract_docx_text(path),
        MIME_TEXT => Ok(std::fs::read_to_string(path)?),
        other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
    }
}

/// A .docx package is a ZIP archive; the document body lives in
/// `word/document.xml` as `<w:t>` text runs grouped into `<w:p>`
/// paragraphs.
fn extract_docx_text(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::Docx(format!("missing document body: {e}")))?;

    let mut xml = String::new();
    document.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let run = t
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(e.to_string()))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractionError::Docx(e.to_string())),
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_text_reads_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Jane Doe\nSenior Rust Engineer").unwrap();

        let text = extract_text(file.path(), MIME_TEXT).unwrap();
        assert_eq!(text, "Jane Doe\nSenior Rust Engineer");
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hello").unwrap();

        let text = extract_text(file.path(), "text/plain; charset=utf-8").unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_unsupported_mime_fails_without_partial_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "binary-ish").unwrap();

        let err = extract_text(file.path(), "image/png").unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(ref m) if m == "image/png"));
    }

    #[test]
    fn test_missing_file_propagates_io_error() {
        let err = extract_text(Path::new("/nonexistent/resume.txt"), MIME_TEXT).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn test_docx_on_non_zip_file_fails_as_docx_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "this is not a zip archive").unwrap();

        let err = extract_text(file.path(), MIME_DOCX).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(_)));
    }

    #[test]
    fn test_docx_text_runs_are_joined_with_paragraph_breaks() {
        // Minimal in-memory .docx: a zip with just word/document.xml.
        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer
                .write_all(
                    br#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
    <w:p><w:r><w:t>Rust </w:t></w:r><w:r><w:t>Engineer</w:t></w:r></w:p>
  </w:body>
</w:document>"#,
                )
                .unwrap();
            writer.finish().unwrap();
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(buffer.get_ref()).unwrap();

        let text = extract_text(file.path(), MIME_DOCX).unwrap();
        assert_eq!(text.trim(), "Jane Doe\nRust Engineer");
    }
}
