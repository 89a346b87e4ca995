use std::sync::Arc;

use tracing::{debug, instrument};

use super::TextRecognizer;
use crate::error::Result;
use crate::frame::Frame;
use crate::pattern::{DocumentFieldValue, DocumentTypeSpec};

/// Composes the recognition capability with the document's format rule.
pub struct TextExtractor {
    recognizer: Arc<dyn TextRecognizer>,
}

impl TextExtractor {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Recognize the frame and pull out the canonical field value.
    ///
    /// Propagates `NotFound` and `RecognitionFailure` unchanged; performs
    /// no retry.
    #[instrument(level = "debug", skip(self, frame), fields(tag = spec.tag()))]
    pub async fn extract(
        &self,
        frame: &Frame,
        spec: &DocumentTypeSpec,
    ) -> Result<DocumentFieldValue> {
        let raw = self.recognizer.recognize(frame, spec.tag()).await?;
        debug!(chars = raw.len(), "Recognizer returned text");
        spec.find_field(&raw)
    }
}
