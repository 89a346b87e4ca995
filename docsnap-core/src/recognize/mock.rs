//! Mock recognizer for tests and development.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::TextRecognizer;
use crate::error::{DocsnapError, Result};
use crate::frame::Frame;

/// Scripted recognizer. Returns a fixed text or a fixed failure, optionally
/// after an artificial delay so in-flight pipeline states can be observed.
pub struct MockRecognizer {
    response: std::result::Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockRecognizer {
    /// Always recognize the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `RecognitionFailure`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            response: Err(reason.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before responding, simulating the remote call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `recognize` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for MockRecognizer {
    async fn recognize(&self, _frame: &Frame, _document_tag: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(reason) => Err(DocsnapError::RecognitionFailure(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::GuideRegion;

    fn test_frame() -> Frame {
        Frame::new(
            image::RgbaImage::new(4, 4),
            GuideRegion {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            },
        )
    }

    #[tokio::test]
    async fn test_scripted_text() {
        let mock = MockRecognizer::with_text("ABCDE1234F");
        let text = mock.recognize(&test_frame(), "pan").await.unwrap();
        assert_eq!(text, "ABCDE1234F");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mock = MockRecognizer::failing("backend offline");
        assert!(matches!(
            mock.recognize(&test_frame(), "pan").await,
            Err(DocsnapError::RecognitionFailure(_))
        ));
    }
}
