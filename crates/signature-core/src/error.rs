use thiserror::Error;

/// Notice shown to the user when "view" is triggered on an untouched surface.
pub const EMPTY_SIGNATURE_NOTICE: &str = "Please provide a signature first.";

#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("{}", EMPTY_SIGNATURE_NOTICE)]
    EmptySignature,

    #[error("A composite operation is already in progress")]
    InProgress,

    #[error("Unsupported image type: {0}")]
    UnsupportedMimeType(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Source document not found: {0}")]
    SourceNotFound(String),

    #[error("Failed to read source document: {0}")]
    SourceIo(#[from] std::io::Error),

    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Document has no pages")]
    NoPages,

    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Failed to encode image: {0}")]
    ImageEncode(String),

    #[error("Failed to serialize PDF: {0}")]
    Serialize(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl CompositeError {
    /// Errors the user can resolve without a change to the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(self, CompositeError::EmptySignature | CompositeError::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_signature_displays_notice() {
        assert_eq!(
            CompositeError::EmptySignature.to_string(),
            "Please provide a signature first."
        );
    }

    #[test]
    fn test_user_errors() {
        assert!(CompositeError::EmptySignature.is_user_error());
        assert!(CompositeError::InProgress.is_user_error());
        assert!(!CompositeError::NoPages.is_user_error());
        assert!(!CompositeError::Task("cancelled".into()).is_user_error());
        assert!(!CompositeError::SourceNotFound("cover-letter.pdf".into()).is_user_error());
    }
}
