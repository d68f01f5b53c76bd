//! Text extraction for uploaded email artifacts.
//!
//! `.txt` uploads are decoded as UTF-8 as-is; `.pdf` uploads have the text
//! of every page joined and trimmed. Anything else is `UnsupportedFormat`.

use tracing::debug;

use crate::error::ExtractError;

/// An uploaded file: client-supplied name plus raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Recognized upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Text,
    Pdf,
}

impl UploadFormat {
    /// Detect by file extension, case-insensitively.
    pub fn detect(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".txt") {
            Some(Self::Text)
        } else if lower.ends_with(".pdf") {
            Some(Self::Pdf)
        } else {
            None
        }
    }
}

/// Extract email text from an upload.
pub fn extract_text(upload: &Upload) -> Result<String, ExtractError> {
    let format =
        UploadFormat::detect(&upload.file_name).ok_or_else(|| ExtractError::UnsupportedFormat {
            file_name: upload.file_name.clone(),
        })?;

    debug!(
        file_name = %upload.file_name,
        bytes = upload.bytes.len(),
        format = ?format,
        "Extracting upload"
    );

    match format {
        UploadFormat::Text => String::from_utf8(upload.bytes.clone()).map_err(|e| {
            ExtractError::InvalidUtf8 {
                file_name: upload.file_name.clone(),
                reason: e.to_string(),
            }
        }),
        UploadFormat::Pdf => {
            let text = pdf_extract::extract_text_from_mem(&upload.bytes).map_err(|e| {
                ExtractError::Pdf {
                    file_name: upload.file_name.clone(),
                    reason: e.to_string(),
                }
            })?;
            Ok(normalize_pdf_text(&text))
        }
    }
}

/// Drop blank lines left between pages and trim the whole text.
fn normalize_pdf_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
