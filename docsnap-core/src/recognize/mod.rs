//! Optical text recognition and field extraction.
//!
//! Recognition itself is an external capability: given an image it returns
//! the raw text it saw, or fails. This module owns the contract for
//! invoking it and for interpreting its result, not the model.
//!
//! ## Implementations
//!
//! - `HttpRecognizer` - remote OCR service over HTTPS (feature `network`)
//! - `MockRecognizer` - scripted responses for tests and development

mod extractor;
#[cfg(feature = "network")]
mod http;
mod mock;

pub use extractor::TextExtractor;
#[cfg(feature = "network")]
pub use http::{HttpOcrConfig, HttpRecognizer};
pub use mock::MockRecognizer;

use async_trait::async_trait;

use crate::error::Result;
use crate::frame::Frame;

/// Capability to recognize text in a captured frame.
///
/// Implementations must be thread-safe (`Send + Sync`). The call is a
/// single attempt: callers never retry, and implementations must not retry
/// internally. A flaky capture is resolved by the user retaking the photo,
/// not by hammering the recognizer.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in the frame, returning it in reading order.
    ///
    /// The document tag (e.g. `"pan"`) lets backends pick a tuned model.
    /// Fails with [`DocsnapError::RecognitionFailure`] when the capability
    /// itself fails.
    ///
    /// [`DocsnapError::RecognitionFailure`]: crate::DocsnapError::RecognitionFailure
    async fn recognize(&self, frame: &Frame, document_tag: &str) -> Result<String>;
}
