use bytes::Bytes;
use tracing::info;

use crate::extraction::ExtractionError;

/// Extracts the raw text layer of a PDF.
///
/// Parsing is CPU-bound, so it runs on the blocking pool.
pub async fn extract_pdf_text(pdf: Bytes) -> Result<String, ExtractionError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| ExtractionError::Pdf(format!("extraction task failed: {e}")))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::EmptyDocument);
    }

    info!("Extracted {} characters from PDF", text.len());
    Ok(text)
}

/// Cheap signature check before handing bytes to the PDF parser.
pub fn looks_like_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_signature() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
        assert!(!looks_like_pdf(b""));
    }

    #[tokio::test]
    async fn test_garbage_is_a_pdf_error() {
        let err = extract_pdf_text(Bytes::from_static(b"not a pdf at all"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }
}
