//! Error types for decoding generated slide payloads.

use thiserror::Error;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors that can occur while turning raw model output into a presentation.
///
/// Every variant is recoverable: the caller is expected to substitute a
/// fallback deck rather than surface these to an end user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// No repair strategy produced valid JSON.
    #[error("Unparseable payload: {0}")]
    Unparseable(String),

    /// The payload parsed but is neither an array nor a `{ "slides": [...] }` object.
    #[error("Unrecognized payload shape: expected an array or an object with a slides array")]
    UnrecognizedShape,

    /// The slides array was present but empty.
    #[error("Presentation has no slides")]
    EmptyPresentation,

    /// Every slide element failed coercion.
    #[error("No valid slides could be constructed")]
    NoValidSlides,

    /// Strict mode rejected a slide element.
    #[error("Schema violation in slide {slide}: {reason}")]
    SchemaViolation {
        /// 0-based index of the offending slide element.
        slide: usize,
        /// What was wrong with it.
        reason: String,
    },
}

impl DecodeError {
    pub(crate) fn schema(slide: usize, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            slide,
            reason: reason.into(),
        }
    }
}
