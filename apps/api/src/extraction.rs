//! Text extraction for uploaded resume files.
//!
//! Runs on the blocking pool: PDF extraction is CPU-bound and must stay off
//! the async runtime. Only formats that reliably yield plain text are
//! accepted; everything else is rejected up front rather than half-parsed.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("unsupported file format '{0}', upload a .pdf or .txt resume")]
    UnsupportedFormat(String),

    #[error("could not read the file: {0}")]
    CorruptFile(String),

    #[error("file is {size} bytes, over the {max} byte limit")]
    SizeExceeded { size: usize, max: usize },
}

/// Pulls plain text out of an uploaded file, dispatching on the extension.
pub fn extract_text(
    filename: &str,
    data: &[u8],
    max_bytes: usize,
) -> Result<String, ExtractionError> {
    if data.len() > max_bytes {
        return Err(ExtractionError::SizeExceeded {
            size: data.len(),
            max: max_bytes,
        });
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ExtractionError::CorruptFile(e.to_string()))?,
        "txt" | "text" => String::from_utf8(data.to_vec())
            .map_err(|_| ExtractionError::CorruptFile("file is not valid UTF-8 text".to_string()))?,
        _ => return Err(ExtractionError::UnsupportedFormat(filename.to_string())),
    };

    debug!(
        "Extracted {} chars from '{}' ({} bytes)",
        text.chars().count(),
        filename,
        data.len()
    );
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 1024;

    #[test]
    fn test_plain_text_upload_passes_through() {
        let text = extract_text("resume.txt", b"Jane Doe\nPython developer", MAX)
            .expect("txt extraction succeeds");
        assert_eq!(text, "Jane Doe\nPython developer");
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert!(extract_text("RESUME.TXT", b"Jane Doe", MAX).is_ok());
    }

    #[test]
    fn test_extracted_text_is_trimmed() {
        let text = extract_text("resume.txt", b"  \n Jane Doe \n\n", MAX).expect("extracts");
        assert_eq!(text, "Jane Doe");
    }

    #[test]
    fn test_invalid_utf8_is_a_corrupt_file() {
        let err = extract_text("resume.txt", &[0xff, 0xfe, 0x00], MAX).unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptFile(_)));
    }

    #[test]
    fn test_unknown_extensions_are_rejected() {
        for filename in ["resume.docx", "resume.png", "resume"] {
            let err = extract_text(filename, b"whatever", MAX).unwrap_err();
            assert!(
                matches!(err, ExtractionError::UnsupportedFormat(ref name) if name == filename),
                "expected UnsupportedFormat for {filename}"
            );
        }
    }

    #[test]
    fn test_oversized_upload_is_rejected_before_parsing() {
        let data = vec![b'a'; MAX + 1];
        let err = extract_text("resume.txt", &data, MAX).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::SizeExceeded { size, max: MAX } if size == MAX + 1
        ));
    }

    #[test]
    fn test_garbage_pdf_is_a_corrupt_file() {
        let err = extract_text("resume.pdf", b"not a pdf at all", MAX).unwrap_err();
        assert!(matches!(err, ExtractionError::CorruptFile(_)));
    }
}
